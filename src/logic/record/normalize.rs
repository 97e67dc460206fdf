//! Record Normalizer
//!
//! Drops identifier-like keys, coerces every raw field to `f64` and fills
//! anything that cannot be coerced with zero. Every fill is recorded in the
//! `NormalizationAudit` and logged, since a mistyped field silently becomes
//! zero instead of failing the request.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logic::config::{MissingFieldPolicy, RecordPolicy, UnknownFieldPolicy};
use crate::logic::error::{PipelineError, PipelineResult};
use super::raw::{NormalizedRow, RawRecord, RAW_FIELDS, RAW_FIELD_COUNT};

/// `ID`, `id`, `customer_id`, `ACCOUNT_ID` ...
static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(id|.+_id)$").expect("identifier pattern is valid"));

/// Check whether a key names a row identifier
pub fn is_identifier_field(name: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(name.trim())
}

// ============================================================================
// AUDIT
// ============================================================================

/// Why a field was filled with zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "raw", rename_all = "snake_case")]
pub enum FallbackReason {
    /// Key not present in the record
    Absent,
    /// Present but not coercible; holds the offending value as JSON text
    NotNumeric(String),
}

/// One field that was replaced with zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercionFallback {
    pub field: String,
    pub reason: FallbackReason,
}

/// Everything the normalizer changed or ignored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationAudit {
    pub dropped_identifiers: Vec<String>,
    pub fallbacks: Vec<CoercionFallback>,
    pub unknown_fields: Vec<String>,
}

impl NormalizationAudit {
    /// True when the row is exactly what the caller sent
    pub fn is_clean(&self) -> bool {
        self.fallbacks.is_empty() && self.unknown_fields.is_empty()
    }

    /// Names of fields filled with zero
    pub fn filled_fields(&self) -> Vec<&str> {
        self.fallbacks.iter().map(|f| f.field.as_str()).collect()
    }
}

/// Normalizer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    pub row: NormalizedRow,
    pub audit: NormalizationAudit,
}

// ============================================================================
// NORMALIZER
// ============================================================================

/// Raw record -> numeric row
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer {
    policy: RecordPolicy,
}

impl RecordNormalizer {
    pub fn new(policy: RecordPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RecordPolicy {
        self.policy
    }

    /// Normalize one record
    ///
    /// Fails only when a policy is set to `Reject` and the record breaks it.
    pub fn normalize(&self, raw: &RawRecord) -> PipelineResult<Normalized> {
        let mut audit = NormalizationAudit::default();

        for key in raw.keys() {
            if is_identifier_field(key) {
                log::debug!("Dropping identifier field `{}`", key);
                audit.dropped_identifiers.push(key.to_string());
            } else if !RAW_FIELDS.contains(&key) {
                if self.policy.unknown_fields == UnknownFieldPolicy::Reject {
                    return Err(PipelineError::UnknownField(key.to_string()));
                }
                log::warn!("Ignoring unknown field `{}`", key);
                audit.unknown_fields.push(key.to_string());
            }
        }

        let mut values = [0.0f64; RAW_FIELD_COUNT];
        for (i, &name) in RAW_FIELDS.iter().enumerate() {
            match raw.get(name) {
                None => {
                    if self.policy.missing_fields == MissingFieldPolicy::Reject {
                        return Err(PipelineError::MalformedRecord(name.to_string()));
                    }
                    log::warn!("Field `{}` absent, filled with 0", name);
                    audit.fallbacks.push(CoercionFallback {
                        field: name.to_string(),
                        reason: FallbackReason::Absent,
                    });
                }
                Some(value) => match coerce(value) {
                    Some(v) => values[i] = v,
                    None => {
                        log::warn!("Field `{}` is not numeric ({}), filled with 0", name, value);
                        audit.fallbacks.push(CoercionFallback {
                            field: name.to_string(),
                            reason: FallbackReason::NotNumeric(value.to_string()),
                        });
                    }
                },
            }
        }

        Ok(Normalized {
            row: NormalizedRow::from_values(values),
            audit,
        })
    }
}

/// Numeric coercion; `None` means fall back to zero
pub fn coerce(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    number.filter(|v| v.is_finite())
}

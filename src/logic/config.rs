//! Pipeline Configuration
//!
//! Threshold, artifact location and input policies. Built from environment
//! variables (see `constants`) and overridden by CLI flags.

use std::path::PathBuf;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::constants;
use super::error::{PipelineError, PipelineResult};

/// What to do when a required raw field is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Fill with zero and record a fallback (reference behaviour)
    #[default]
    ZeroFill,
    /// Fail the request with `MalformedRecord`
    Reject,
}

impl FromStr for MissingFieldPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" | "zero_fill" | "fill" => Ok(Self::ZeroFill),
            "reject" | "error" => Ok(Self::Reject),
            other => Err(PipelineError::Config(format!("unknown missing-field policy: {}", other))),
        }
    }
}

/// What to do with keys that are neither raw fields nor identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    /// Ignore the key, log it and flag it in the audit
    #[default]
    Warn,
    /// Fail the request with `UnknownField`
    Reject,
}

impl FromStr for UnknownFieldPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warn" | "ignore" => Ok(Self::Warn),
            "reject" | "error" => Ok(Self::Reject),
            other => Err(PipelineError::Config(format!("unknown unknown-field policy: {}", other))),
        }
    }
}

/// Normalization policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RecordPolicy {
    pub missing_fields: MissingFieldPolicy,
    pub unknown_fields: UnknownFieldPolicy,
}

impl RecordPolicy {
    /// Fail on any absent or unexpected field
    pub fn strict() -> Self {
        Self {
            missing_fields: MissingFieldPolicy::Reject,
            unknown_fields: UnknownFieldPolicy::Reject,
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path to the XGBoost JSON model artifact
    pub model_path: PathBuf,

    /// Decision threshold (0.0 - 1.0)
    pub threshold: f64,

    /// Normalization policies
    pub record_policy: RecordPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            threshold: constants::DEFAULT_THRESHOLD,
            record_policy: RecordPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// Unparsable values are errors. The threshold range is left to
    /// `validate`, so callers can apply overrides first.
    pub fn from_env() -> PipelineResult<Self> {
        Ok(Self {
            model_path: PathBuf::from(constants::get_model_path()),
            threshold: parse_threshold(constants::get_threshold().as_deref())?,
            record_policy: RecordPolicy {
                missing_fields: constants::get_missing_field_policy().parse()?,
                unknown_fields: constants::get_unknown_field_policy().parse()?,
            },
        })
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_record_policy(mut self, policy: RecordPolicy) -> Self {
        self.record_policy = policy;
        self
    }

    /// Reject thresholds outside [0, 1]
    pub fn validate(&self) -> PipelineResult<()> {
        validate_threshold(self.threshold)
    }
}

/// Threshold from its raw text; unset means the default
pub fn parse_threshold(raw: Option<&str>) -> PipelineResult<f64> {
    match raw {
        None => Ok(constants::DEFAULT_THRESHOLD),
        Some(text) => text.trim().parse().map_err(|_| {
            PipelineError::Config(format!("threshold `{}` is not a number", text))
        }),
    }
}

pub fn validate_threshold(threshold: f64) -> PipelineResult<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(PipelineError::Config(format!(
            "threshold must be within [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.record_policy.missing_fields, MissingFieldPolicy::ZeroFill);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(PipelineConfig::default().with_threshold(1.0).validate().is_ok());
        assert!(PipelineConfig::default().with_threshold(0.0).validate().is_ok());
        assert!(PipelineConfig::default().with_threshold(1.5).validate().is_err());
        assert!(PipelineConfig::default().with_threshold(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_threshold_text() {
        assert_eq!(parse_threshold(None).unwrap(), 0.5);
        assert_eq!(parse_threshold(Some(" 0.7 ")).unwrap(), 0.7);
        assert!(matches!(parse_threshold(Some("0,7")), Err(PipelineError::Config(_))));
        assert!(matches!(parse_threshold(Some("")), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_override_replaces_out_of_range_value() {
        let from_env = PipelineConfig::default().with_threshold(parse_threshold(Some("1.5")).unwrap());
        assert!(from_env.validate().is_err());
        assert!(from_env.with_threshold(0.7).validate().is_ok());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("zero".parse::<MissingFieldPolicy>().unwrap(), MissingFieldPolicy::ZeroFill);
        assert_eq!("REJECT".parse::<MissingFieldPolicy>().unwrap(), MissingFieldPolicy::Reject);
        assert_eq!("warn".parse::<UnknownFieldPolicy>().unwrap(), UnknownFieldPolicy::Warn);
        assert!("sometimes".parse::<UnknownFieldPolicy>().is_err());
    }
}

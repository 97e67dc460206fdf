//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The trained model was fit against these column names in exactly this
//! order, and attributions are reported positionally against it.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//! 4. Any change requires a retrained model artifact

use crc32fast::Hasher;
use once_cell::sync::Lazy;

use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::record::raw::RAW_FIELD_COUNT;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the row
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Raw normalized columns (0-22) ===
    "LIMIT_BAL", "SEX", "EDUCATION", "MARRIAGE", "AGE",
    "PAY_0", "PAY_2", "PAY_3", "PAY_4", "PAY_5", "PAY_6",
    "BILL_AMT1", "BILL_AMT2", "BILL_AMT3", "BILL_AMT4", "BILL_AMT5", "BILL_AMT6",
    "PAY_AMT1", "PAY_AMT2", "PAY_AMT3", "PAY_AMT4", "PAY_AMT5", "PAY_AMT6",

    // === Payment status (23-27) ===
    "avg_delay",             // 23: Mean repayment status
    "max_delay",             // 24: Worst repayment status
    "min_delay",             // 25: Best repayment status
    "num_delays",            // 26: Months with status > 0
    "num_severe_delays",     // 27: Months with status >= 2

    // === Bill amounts (28-33) ===
    "avg_bill",              // 28
    "max_bill",              // 29
    "min_bill",              // 30
    "bill_std",              // 31: Sample standard deviation
    "bill_growth",           // 32: BILL_AMT6 - BILL_AMT1
    "bill_trend",            // 33: OLS slope over months 0..5

    // === Payment amounts (34-38) ===
    "avg_pay_amt",           // 34
    "max_pay_amt",           // 35
    "min_pay_amt",           // 36
    "pay_amt_std",           // 37: Sample standard deviation
    "pay_amt_growth",        // 38: PAY_AMT6 - PAY_AMT1

    // === Ratios (39-41) ===
    "utilization_ratio",     // 39: avg_bill / (LIMIT_BAL + 1)
    "repayment_ratio",       // 40: avg_pay_amt / (avg_bill + 1)
    "income_to_limit",       // 41: LIMIT_BAL / (BILL_AMT1 + 1)

    // === Volatility (42-43) ===
    "bill_volatility",       // 42: same value as bill_std
    "payment_volatility",    // 43: same value as pay_amt_std

    // === Acceleration (44) ===
    "debt_acceleration",     // 44: (B6 - B5) - (B2 - B1)

    // === Totals (45-47) ===
    "total_bill_6m",         // 45
    "total_pay_6m",          // 46
    "difference_bill_pay",   // 47: total_bill_6m - total_pay_6m
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 48;

/// Number of engineered columns appended after the raw ones
pub const DERIVED_COUNT: usize = FEATURE_COUNT - RAW_FIELD_COUNT;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches at runtime
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

/// Layout hash, computed once per process
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Check a model's trained column names against the current layout
pub fn validate_feature_names(names: &[String]) -> PipelineResult<()> {
    if names.len() != FEATURE_COUNT {
        return Err(PipelineError::column_count(names.len(), FEATURE_COUNT));
    }

    if let Some((i, (trained, ours))) = names
        .iter()
        .zip(FEATURE_LAYOUT.iter())
        .enumerate()
        .find(|(_, (trained, ours))| trained.as_str() != **ours)
    {
        return Err(PipelineError::FeatureShape {
            expected: format!("`{}` at column {}", trained, i),
            actual: format!("`{}`", ours),
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::record::raw::RAW_FIELDS;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 48);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_eq!(DERIVED_COUNT, 25);
    }

    #[test]
    fn test_raw_columns_lead_the_layout() {
        assert_eq!(&FEATURE_LAYOUT[..RAW_FIELD_COUNT], RAW_FIELDS);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = FEATURE_LAYOUT.to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_eq!(layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_feature_names() {
        let names: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
        assert!(validate_feature_names(&names).is_ok());

        let mut swapped = names.clone();
        swapped.swap(23, 24);
        assert!(validate_feature_names(&swapped).is_err());

        assert!(validate_feature_names(&names[..47]).is_err());
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("LIMIT_BAL"), Some(0));
        assert_eq!(feature_index("avg_delay"), Some(23));
        assert_eq!(feature_index("bill_trend"), Some(33));
        assert_eq!(feature_index("difference_bill_pay"), Some(47));
        assert_eq!(feature_index("nonexistent"), None);
        assert_eq!(feature_name(47), Some("difference_bill_pay"));
        assert_eq!(feature_name(100), None);
    }
}

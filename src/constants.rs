//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Environment variables override these at runtime.

/// Default location of the trained XGBoost model artifact
pub const DEFAULT_MODEL_PATH: &str = "models/final_xgb_model.json";

/// Default decision threshold on the default probability
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Number of features shown by the reference UI's importance chart
pub const DEFAULT_IMPORTANCE_TOP_N: usize = 15;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Credit-Risk";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("CREDIT_MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Raw decision threshold from environment, if set
pub fn get_threshold() -> Option<String> {
    std::env::var("CREDIT_THRESHOLD").ok()
}

/// Get missing-field policy name from environment (`zero` or `reject`)
pub fn get_missing_field_policy() -> String {
    std::env::var("CREDIT_MISSING_FIELDS")
        .unwrap_or_else(|_| "zero".to_string())
}

/// Get unknown-field policy name from environment (`warn` or `reject`)
pub fn get_unknown_field_policy() -> String {
    std::env::var("CREDIT_UNKNOWN_FIELDS")
        .unwrap_or_else(|_| "warn".to_string())
}

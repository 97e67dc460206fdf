//! Feature Row - Core data structure for model input
//!
//! **Versioned feature row with layout validation**
//!
//! Raw normalized columns first, engineered columns after, in the order
//! defined by `layout.rs`.

use serde::{Deserialize, Serialize};
use super::layout::{
    FEATURE_COUNT, FEATURE_VERSION, FEATURE_LAYOUT,
    feature_index, layout_hash,
};

// ============================================================================
// VERSIONED FEATURE ROW
// ============================================================================

/// Versioned feature row with layout metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: Vec<f64>,
}

impl FeatureRow {
    /// Zeroed row with current version
    pub fn new() -> Self {
        Self::from_values([0.0; FEATURE_COUNT])
    }

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: values.to_vec(),
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }

    pub fn set(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        if let Some(index) = feature_index(name) {
            self.set(index, value);
            true
        } else {
            false
        }
    }

    /// True when the row matches the current layout version, hash and width
    pub fn is_compatible(&self) -> bool {
        self.version == FEATURE_VERSION
            && self.layout_hash == layout_hash()
            && self.values.len() == FEATURE_COUNT
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }

    /// (name, value) pairs in column order
    pub fn named_values(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_LAYOUT.iter().copied().zip(self.values.iter().copied())
    }

    /// JSON form for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        let named: serde_json::Map<String, serde_json::Value> = self
            .named_values()
            .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
            .collect();

        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": named,
        })
    }
}

impl Default for FeatureRow {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// A group of engineered features that writes itself into a row
pub trait FeatureExtractor {
    fn extract(&self, row: &mut FeatureRow);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_row_new() {
        let row = FeatureRow::new();
        assert_eq!(row.version, FEATURE_VERSION);
        assert_eq!(row.layout_hash, layout_hash());
        assert_eq!(row.len(), FEATURE_COUNT);
        assert!(row.is_compatible());
    }

    #[test]
    fn test_set_by_name() {
        let mut row = FeatureRow::new();
        assert!(row.set_by_name("bill_trend", 1000.0));
        assert_eq!(row.get_by_name("bill_trend"), Some(1000.0));
        assert!(!row.set_by_name("nonexistent", 0.0));
    }

    #[test]
    fn test_truncated_row_is_incompatible() {
        let mut row = FeatureRow::new();
        row.values.pop();
        assert!(!row.is_compatible());
    }

    #[test]
    fn test_to_log_entry() {
        let mut row = FeatureRow::new();
        row.set_by_name("AGE", 30.0);

        let log = row.to_log_entry();
        assert_eq!(log["feature_version"], FEATURE_VERSION);
        assert_eq!(log["named_values"]["AGE"], 30.0);
    }
}

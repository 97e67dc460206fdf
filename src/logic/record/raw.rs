//! Raw Record - Input schema for one credit account
//!
//! 23 numeric fields: credit limit, demographics, six months of repayment
//! status, bill amounts and paid amounts. Month 1 is the most recent
//! statement column in the source dataset (`PAY_0`, `BILL_AMT1`, `PAY_AMT1`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logic::error::PipelineResult;

// ============================================================================
// RAW SCHEMA (Authoritative source)
// ============================================================================

/// Raw field names in declared order
pub const RAW_FIELDS: &[&str] = &[
    "LIMIT_BAL", "SEX", "EDUCATION", "MARRIAGE", "AGE",
    "PAY_0", "PAY_2", "PAY_3", "PAY_4", "PAY_5", "PAY_6",
    "BILL_AMT1", "BILL_AMT2", "BILL_AMT3", "BILL_AMT4", "BILL_AMT5", "BILL_AMT6",
    "PAY_AMT1", "PAY_AMT2", "PAY_AMT3", "PAY_AMT4", "PAY_AMT5", "PAY_AMT6",
];

/// Total number of raw fields
pub const RAW_FIELD_COUNT: usize = 23;

/// Repayment status columns (the source dataset has no `PAY_1`)
pub const PAY_STATUS_FIELDS: [&str; 6] = ["PAY_0", "PAY_2", "PAY_3", "PAY_4", "PAY_5", "PAY_6"];

pub const BILL_AMT_FIELDS: [&str; 6] = [
    "BILL_AMT1", "BILL_AMT2", "BILL_AMT3", "BILL_AMT4", "BILL_AMT5", "BILL_AMT6",
];

pub const PAY_AMT_FIELDS: [&str; 6] = [
    "PAY_AMT1", "PAY_AMT2", "PAY_AMT3", "PAY_AMT4", "PAY_AMT5", "PAY_AMT6",
];

// ============================================================================
// RAW RECORD
// ============================================================================

/// Loosely-typed record as received from a caller
///
/// Values may be numbers, numeric strings or anything else; coercion happens
/// in the normalizer. Key order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        let fields: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self { fields })
    }

    /// Wrap a JSON value; fails unless it is an object
    pub fn from_value(value: Value) -> PipelineResult<Self> {
        let fields: Map<String, Value> = serde_json::from_value(value)?;
        Ok(Self { fields })
    }

    /// Build from (name, value) pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { fields }
    }

    /// Set a field
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sample customer used by the demo command
    pub fn sample() -> Self {
        Self::from_pairs([
            ("LIMIT_BAL", 50000),
            ("SEX", 1),
            ("EDUCATION", 2),
            ("MARRIAGE", 1),
            ("AGE", 30),
            ("PAY_0", 1),
            ("PAY_2", 0),
            ("PAY_3", 0),
            ("PAY_4", 0),
            ("PAY_5", 0),
            ("PAY_6", 0),
            ("BILL_AMT1", 20000),
            ("BILL_AMT2", 21000),
            ("BILL_AMT3", 22000),
            ("BILL_AMT4", 23000),
            ("BILL_AMT5", 24000),
            ("BILL_AMT6", 25000),
            ("PAY_AMT1", 5000),
            ("PAY_AMT2", 4000),
            ("PAY_AMT3", 3000),
            ("PAY_AMT4", 3000),
            ("PAY_AMT5", 2000),
            ("PAY_AMT6", 1000),
        ])
    }
}

// ============================================================================
// NORMALIZED ROW
// ============================================================================

/// Clean numeric row: identifier removed, every field present and numeric
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub limit_bal: f64,
    pub sex: f64,
    pub education: f64,
    pub marriage: f64,
    pub age: f64,
    /// PAY_0, PAY_2 .. PAY_6
    pub pay_status: [f64; 6],
    /// BILL_AMT1 .. BILL_AMT6
    pub bill_amt: [f64; 6],
    /// PAY_AMT1 .. PAY_AMT6
    pub pay_amt: [f64; 6],
}

impl NormalizedRow {
    /// Build from values in `RAW_FIELDS` order
    pub fn from_values(values: [f64; RAW_FIELD_COUNT]) -> Self {
        let mut row = Self {
            limit_bal: values[0],
            sex: values[1],
            education: values[2],
            marriage: values[3],
            age: values[4],
            ..Default::default()
        };
        row.pay_status.copy_from_slice(&values[5..11]);
        row.bill_amt.copy_from_slice(&values[11..17]);
        row.pay_amt.copy_from_slice(&values[17..23]);
        row
    }

    /// Values in `RAW_FIELDS` order
    pub fn to_values(&self) -> [f64; RAW_FIELD_COUNT] {
        let mut values = [0.0; RAW_FIELD_COUNT];
        values[0] = self.limit_bal;
        values[1] = self.sex;
        values[2] = self.education;
        values[3] = self.marriage;
        values[4] = self.age;
        values[5..11].copy_from_slice(&self.pay_status);
        values[11..17].copy_from_slice(&self.bill_amt);
        values[17..23].copy_from_slice(&self.pay_amt);
        values
    }

    /// Get field by raw name
    pub fn get(&self, name: &str) -> Option<f64> {
        field_index(name).map(|i| self.to_values()[i])
    }
}

/// Position of a raw field in `RAW_FIELDS`
pub fn field_index(name: &str) -> Option<usize> {
    RAW_FIELDS.iter().position(|&n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_field_count() {
        assert_eq!(RAW_FIELDS.len(), RAW_FIELD_COUNT);
        assert_eq!(&RAW_FIELDS[5..11], &PAY_STATUS_FIELDS[..]);
        assert_eq!(&RAW_FIELDS[11..17], &BILL_AMT_FIELDS[..]);
        assert_eq!(&RAW_FIELDS[17..23], &PAY_AMT_FIELDS[..]);
    }

    #[test]
    fn test_values_layout() {
        let mut values = [0.0; RAW_FIELD_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f64;
        }
        let row = NormalizedRow::from_values(values);

        assert_eq!(row.limit_bal, 0.0);
        assert_eq!(row.age, 4.0);
        assert_eq!(row.pay_status[0], 5.0);
        assert_eq!(row.bill_amt[5], 16.0);
        assert_eq!(row.pay_amt[0], 17.0);
        assert_eq!(row.to_values(), values);
        assert_eq!(row.get("PAY_AMT6"), Some(22.0));
        assert_eq!(row.get("ID"), None);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(RawRecord::from_json_str("[1, 2, 3]").is_err());
        assert!(RawRecord::from_json_str(r#"{"AGE": 30}"#).is_ok());
    }

    #[test]
    fn test_sample_has_all_fields() {
        let sample = RawRecord::sample();
        assert_eq!(sample.len(), RAW_FIELD_COUNT);
        for name in RAW_FIELDS {
            assert!(sample.get(name).is_some(), "missing {}", name);
        }
    }
}

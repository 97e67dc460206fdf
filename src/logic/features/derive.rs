//! Feature Deriver
//!
//! Pure function from a normalized row to the full model input row.

use crate::logic::record::NormalizedRow;
use super::bill::BillFeatures;
use super::composite::CompositeFeatures;
use super::delay::DelayFeatures;
use super::layout::FEATURE_COUNT;
use super::payment::PaymentFeatures;
use super::vector::{FeatureExtractor, FeatureRow};
use crate::logic::record::raw::RAW_FIELD_COUNT;

/// NormalizedRow -> FeatureRow
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureDeriver;

impl FeatureDeriver {
    pub fn new() -> Self {
        Self
    }

    /// Raw columns in declared order, then every engineered group
    pub fn derive(&self, row: &NormalizedRow) -> FeatureRow {
        let mut values = [0.0f64; FEATURE_COUNT];
        values[..RAW_FIELD_COUNT].copy_from_slice(&row.to_values());
        let mut features = FeatureRow::from_values(values);

        let delay = DelayFeatures::from_window(&row.pay_status);
        let bill = BillFeatures::from_window(&row.bill_amt);
        let pay = PaymentFeatures::from_window(&row.pay_amt);
        let composite = CompositeFeatures::compute(row, &bill, &pay);

        let groups: [&dyn FeatureExtractor; 4] = [&delay, &bill, &pay, &composite];
        for group in groups {
            group.extract(&mut features);
        }

        features
    }
}

/// Shorthand for `FeatureDeriver::new().derive(row)`
pub fn derive_features(row: &NormalizedRow) -> FeatureRow {
    FeatureDeriver::new().derive(row)
}

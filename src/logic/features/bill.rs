//! Bill Amount Features
//!
//! Level, spread and drift of the six billed amounts (`BILL_AMT1`..`BILL_AMT6`).

use super::stats;
use super::vector::{FeatureExtractor, FeatureRow};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BillFeatures {
    pub avg_bill: f64,
    pub max_bill: f64,
    pub min_bill: f64,
    pub bill_std: f64,
    /// BILL_AMT6 - BILL_AMT1
    pub bill_growth: f64,
    /// Least-squares slope per month
    pub bill_trend: f64,
}

impl BillFeatures {
    pub fn from_window(bills: &[f64; 6]) -> Self {
        Self {
            avg_bill: stats::mean(bills),
            max_bill: stats::max(bills),
            min_bill: stats::min(bills),
            bill_std: stats::sample_std(bills),
            bill_growth: bills[5] - bills[0],
            bill_trend: stats::ols_slope(bills),
        }
    }
}

impl FeatureExtractor for BillFeatures {
    fn extract(&self, row: &mut FeatureRow) {
        row.set_by_name("avg_bill", self.avg_bill);
        row.set_by_name("max_bill", self.max_bill);
        row.set_by_name("min_bill", self.min_bill);
        row.set_by_name("bill_std", self.bill_std);
        row.set_by_name("bill_growth", self.bill_growth);
        row.set_by_name("bill_trend", self.bill_trend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_bills() {
        let bill = BillFeatures::from_window(&[20000.0, 21000.0, 22000.0, 23000.0, 24000.0, 25000.0]);

        assert!((bill.bill_trend - 1000.0).abs() < 1e-9);
        assert_eq!(bill.bill_growth, 5000.0);
        assert_eq!(bill.avg_bill, 22500.0);
        assert_eq!(bill.max_bill, 25000.0);
        assert_eq!(bill.min_bill, 20000.0);
        // squared deviations sum to 17.5e6 over n - 1 = 5
        assert!((bill.bill_std - 3_500_000f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_negative_balance_allowed() {
        // Overpayments show up as negative bills in the source data
        let bill = BillFeatures::from_window(&[-500.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(bill.min_bill, -500.0);
        assert_eq!(bill.bill_growth, 500.0);
    }
}

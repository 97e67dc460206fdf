//! Payment Amount Features
//!
//! Same window formulas as the bill group, over `PAY_AMT1`..`PAY_AMT6`.

use super::stats;
use super::vector::{FeatureExtractor, FeatureRow};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaymentFeatures {
    pub avg_pay_amt: f64,
    pub max_pay_amt: f64,
    pub min_pay_amt: f64,
    pub pay_amt_std: f64,
    /// PAY_AMT6 - PAY_AMT1
    pub pay_amt_growth: f64,
}

impl PaymentFeatures {
    pub fn from_window(payments: &[f64; 6]) -> Self {
        Self {
            avg_pay_amt: stats::mean(payments),
            max_pay_amt: stats::max(payments),
            min_pay_amt: stats::min(payments),
            pay_amt_std: stats::sample_std(payments),
            pay_amt_growth: payments[5] - payments[0],
        }
    }
}

impl FeatureExtractor for PaymentFeatures {
    fn extract(&self, row: &mut FeatureRow) {
        row.set_by_name("avg_pay_amt", self.avg_pay_amt);
        row.set_by_name("max_pay_amt", self.max_pay_amt);
        row.set_by_name("min_pay_amt", self.min_pay_amt);
        row.set_by_name("pay_amt_std", self.pay_amt_std);
        row.set_by_name("pay_amt_growth", self.pay_amt_growth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declining_payments() {
        let pay = PaymentFeatures::from_window(&[5000.0, 4000.0, 3000.0, 3000.0, 2000.0, 1000.0]);

        assert_eq!(pay.avg_pay_amt, 3000.0);
        assert_eq!(pay.max_pay_amt, 5000.0);
        assert_eq!(pay.min_pay_amt, 1000.0);
        assert_eq!(pay.pay_amt_growth, -4000.0);
        // deviations: 2000,1000,0,0,-1000,-2000 -> 10e6 / 5
        assert!((pay.pay_amt_std - 2_000_000f64.sqrt()).abs() < 1e-9);
    }
}

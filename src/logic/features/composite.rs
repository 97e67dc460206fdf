//! Composite Features
//!
//! Ratios, volatility, debt acceleration and six-month totals. Built on top
//! of the bill and payment groups.
//!
//! Ratio denominators are offset by 1 instead of branching on zero, so a
//! zero limit or zero bill still yields a finite value.

use crate::logic::record::NormalizedRow;
use super::bill::BillFeatures;
use super::payment::PaymentFeatures;
use super::stats;
use super::vector::{FeatureExtractor, FeatureRow};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompositeFeatures {
    pub utilization_ratio: f64,
    pub repayment_ratio: f64,
    pub income_to_limit: f64,
    pub bill_volatility: f64,
    pub payment_volatility: f64,
    pub debt_acceleration: f64,
    pub total_bill_6m: f64,
    pub total_pay_6m: f64,
    pub difference_bill_pay: f64,
}

impl CompositeFeatures {
    pub fn compute(row: &NormalizedRow, bill: &BillFeatures, pay: &PaymentFeatures) -> Self {
        let b = &row.bill_amt;
        let total_bill_6m = stats::sum(b);
        let total_pay_6m = stats::sum(&row.pay_amt);

        Self {
            utilization_ratio: bill.avg_bill / (row.limit_bal + 1.0),
            repayment_ratio: pay.avg_pay_amt / (bill.avg_bill + 1.0),
            income_to_limit: row.limit_bal / (b[0] + 1.0),
            // Kept as separate columns: the model was trained on both names
            bill_volatility: bill.bill_std,
            payment_volatility: pay.pay_amt_std,
            debt_acceleration: (b[5] - b[4]) - (b[1] - b[0]),
            total_bill_6m,
            total_pay_6m,
            difference_bill_pay: total_bill_6m - total_pay_6m,
        }
    }
}

impl FeatureExtractor for CompositeFeatures {
    fn extract(&self, row: &mut FeatureRow) {
        row.set_by_name("utilization_ratio", self.utilization_ratio);
        row.set_by_name("repayment_ratio", self.repayment_ratio);
        row.set_by_name("income_to_limit", self.income_to_limit);
        row.set_by_name("bill_volatility", self.bill_volatility);
        row.set_by_name("payment_volatility", self.payment_volatility);
        row.set_by_name("debt_acceleration", self.debt_acceleration);
        row.set_by_name("total_bill_6m", self.total_bill_6m);
        row.set_by_name("total_pay_6m", self.total_pay_6m);
        row.set_by_name("difference_bill_pay", self.difference_bill_pay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(row: &NormalizedRow) -> CompositeFeatures {
        let bill = BillFeatures::from_window(&row.bill_amt);
        let pay = PaymentFeatures::from_window(&row.pay_amt);
        CompositeFeatures::compute(row, &bill, &pay)
    }

    #[test]
    fn test_zero_limit_and_zero_bills_stay_finite() {
        let row = NormalizedRow::default();
        let c = compute(&row);

        assert!(c.utilization_ratio.is_finite());
        assert!(c.repayment_ratio.is_finite());
        assert!(c.income_to_limit.is_finite());
        assert_eq!(c.utilization_ratio, 0.0);
        assert_eq!(c.repayment_ratio, 0.0);
    }

    #[test]
    fn test_linear_bills_have_no_acceleration() {
        let row = NormalizedRow {
            limit_bal: 50000.0,
            bill_amt: [20000.0, 21000.0, 22000.0, 23000.0, 24000.0, 25000.0],
            pay_amt: [5000.0, 4000.0, 3000.0, 3000.0, 2000.0, 1000.0],
            ..Default::default()
        };
        let c = compute(&row);

        assert_eq!(c.debt_acceleration, 0.0);
        assert_eq!(c.total_bill_6m, 135000.0);
        assert_eq!(c.total_pay_6m, 18000.0);
        assert_eq!(c.difference_bill_pay, 117000.0);
        assert!((c.utilization_ratio - 22500.0 / 50001.0).abs() < 1e-12);
        assert!((c.repayment_ratio - 3000.0 / 22501.0).abs() < 1e-12);
        assert!((c.income_to_limit - 50000.0 / 20001.0).abs() < 1e-12);
    }

    #[test]
    fn test_volatility_duplicates_std() {
        let row = NormalizedRow {
            bill_amt: [1.0, 5.0, 2.0, 8.0, 3.0, 9.0],
            pay_amt: [0.0, 100.0, 0.0, 100.0, 0.0, 100.0],
            ..Default::default()
        };
        let bill = BillFeatures::from_window(&row.bill_amt);
        let pay = PaymentFeatures::from_window(&row.pay_amt);
        let c = CompositeFeatures::compute(&row, &bill, &pay);

        assert_eq!(c.bill_volatility, bill.bill_std);
        assert_eq!(c.payment_volatility, pay.pay_amt_std);
    }

    #[test]
    fn test_accelerating_debt() {
        let row = NormalizedRow {
            bill_amt: [1000.0, 1100.0, 1300.0, 1600.0, 2000.0, 2500.0],
            ..Default::default()
        };
        // (2500 - 2000) - (1100 - 1000)
        assert_eq!(compute(&row).debt_acceleration, 400.0);
    }
}

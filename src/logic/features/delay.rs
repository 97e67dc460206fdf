//! Payment Status Features
//!
//! Aggregates over the six repayment status codes (`PAY_0`, `PAY_2`..`PAY_6`).
//! Codes above 0 are months of delay; 2 or more is a severe delay.

use super::stats;
use super::vector::{FeatureExtractor, FeatureRow};

/// Status code above which a month counts as delayed
pub const DELAY_THRESHOLD: f64 = 0.0;

/// Status code from which a delay counts as severe
pub const SEVERE_DELAY_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DelayFeatures {
    pub avg_delay: f64,
    pub max_delay: f64,
    pub min_delay: f64,
    pub num_delays: usize,
    pub num_severe_delays: usize,
}

impl DelayFeatures {
    pub fn from_window(status: &[f64; 6]) -> Self {
        Self {
            avg_delay: stats::mean(status),
            max_delay: stats::max(status),
            min_delay: stats::min(status),
            num_delays: stats::count_above(status, DELAY_THRESHOLD),
            num_severe_delays: stats::count_at_least(status, SEVERE_DELAY_THRESHOLD),
        }
    }
}

impl FeatureExtractor for DelayFeatures {
    fn extract(&self, row: &mut FeatureRow) {
        row.set_by_name("avg_delay", self.avg_delay);
        row.set_by_name("max_delay", self.max_delay);
        row.set_by_name("min_delay", self.min_delay);
        row.set_by_name("num_delays", self.num_delays as f64);
        row.set_by_name("num_severe_delays", self.num_severe_delays as f64);
    }
}

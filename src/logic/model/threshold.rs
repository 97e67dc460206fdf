//! Decision Threshold
//!
//! Turns a probability into a 0/1 label. The threshold is configuration,
//! never a constant baked into the model.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_THRESHOLD;
use crate::logic::config::validate_threshold;
use crate::logic::error::PipelineResult;
use crate::logic::features::FeatureRow;
use super::inference::Classifier;

/// Risk bands used by the reporting UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// `< 0.30` low, `< 0.60` medium, else high
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.30 {
            RiskLevel::Low
        } else if probability < 0.60 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// Prediction result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability of default (0.0 - 1.0)
    pub probability: f64,
    /// 1 = default, 0 = no default
    pub prediction: u8,
    pub threshold: f64,
    pub risk_level: RiskLevel,
}

impl Prediction {
    pub fn new(probability: f64, threshold: f64) -> Self {
        Self {
            probability,
            prediction: decide(probability, threshold),
            threshold,
            risk_level: RiskLevel::from_probability(probability),
        }
    }
}

/// `1` iff `probability >= threshold`
pub fn decide(probability: f64, threshold: f64) -> u8 {
    u8::from(probability >= threshold)
}

/// Threshold configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub threshold: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD }
    }
}

impl ThresholdConfig {
    pub fn new(threshold: f64) -> PipelineResult<Self> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    /// Score a row and apply the threshold
    pub fn classify(&self, model: &dyn Classifier, row: &FeatureRow) -> PipelineResult<Prediction> {
        let probability = model.predict_proba(row)?;
        let prediction = Prediction::new(probability, self.threshold);
        log::debug!(
            "Prediction: p={:.4} label={} threshold={}",
            prediction.probability,
            prediction.prediction,
            self.threshold
        );
        Ok(prediction)
    }
}

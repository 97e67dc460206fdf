//! Credit Pipeline - Composition root
//!
//! raw record → normalize → derive → (predict, explain)
//!
//! The model handle is injected, never looked up globally. Every call
//! builds its rows fresh and either returns a complete result or an error.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use super::config::PipelineConfig;
use super::error::PipelineResult;
use super::explain::{Explainer, Explanation, FeatureImportance, TreeShapExplainer};
use super::features::{FeatureDeriver, FeatureRow};
use super::model::{ModelGateway, ModelHandle, Prediction, ThresholdConfig};
use super::record::{NormalizationAudit, RawRecord, RecordNormalizer};

/// Feature row plus what normalization had to change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedRecord {
    pub features: FeatureRow,
    pub audit: NormalizationAudit,
}

/// Prediction for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub audit: NormalizationAudit,
}

/// Prediction and explanation from the same feature row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub prediction: Prediction,
    pub explanation: Explanation,
    pub audit: NormalizationAudit,
}

pub struct CreditPipeline {
    model: Arc<ModelHandle>,
    normalizer: RecordNormalizer,
    deriver: FeatureDeriver,
    threshold: ThresholdConfig,
    explainer: Arc<dyn Explainer + Send + Sync>,
}

impl CreditPipeline {
    pub fn new(model: Arc<ModelHandle>, config: &PipelineConfig) -> PipelineResult<Self> {
        Ok(Self {
            model,
            normalizer: RecordNormalizer::new(config.record_policy),
            deriver: FeatureDeriver::new(),
            threshold: ThresholdConfig::new(config.threshold)?,
            explainer: Arc::new(TreeShapExplainer::default()),
        })
    }

    /// Build from a gateway, loading the model on first use
    pub fn from_gateway(gateway: &ModelGateway, config: &PipelineConfig) -> PipelineResult<Self> {
        Self::new(gateway.get()?, config)
    }

    /// Swap the attribution method
    pub fn with_explainer(mut self, explainer: Arc<dyn Explainer + Send + Sync>) -> Self {
        self.explainer = explainer;
        self
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn threshold(&self) -> f64 {
        self.threshold.threshold
    }

    /// Normalize and derive
    pub fn prepare(&self, raw: &RawRecord) -> PipelineResult<PreparedRecord> {
        let normalized = self.normalizer.normalize(raw)?;
        Ok(PreparedRecord {
            features: self.deriver.derive(&normalized.row),
            audit: normalized.audit,
        })
    }

    pub fn predict(&self, raw: &RawRecord) -> PipelineResult<ScoredRecord> {
        let prepared = self.prepare(raw)?;
        let prediction = self.predict_row(&prepared.features)?;
        Ok(ScoredRecord {
            prediction,
            audit: prepared.audit,
        })
    }

    pub fn predict_row(&self, row: &FeatureRow) -> PipelineResult<Prediction> {
        self.threshold.classify(self.model.as_ref(), row)
    }

    pub fn explain(&self, raw: &RawRecord) -> PipelineResult<Explanation> {
        let prepared = self.prepare(raw)?;
        self.explain_row(&prepared.features)
    }

    pub fn explain_row(&self, row: &FeatureRow) -> PipelineResult<Explanation> {
        self.explainer.explain(&self.model, row)
    }

    pub fn global_importance(&self) -> FeatureImportance {
        self.explainer.global_importance(&self.model)
    }

    /// Prediction and explanation together; no partial result on failure
    pub fn assess(&self, raw: &RawRecord) -> PipelineResult<Assessment> {
        let prepared = self.prepare(raw)?;
        let prediction = self.predict_row(&prepared.features)?;
        let explanation = self.explain_row(&prepared.features)?;

        Ok(Assessment {
            prediction,
            explanation,
            audit: prepared.audit,
        })
    }
}

/// One-shot prediction with default record policies
pub fn predict_single(raw: &RawRecord, model: &ModelHandle, threshold: f64) -> PipelineResult<Prediction> {
    let normalized = RecordNormalizer::default().normalize(raw)?;
    let row = FeatureDeriver::new().derive(&normalized.row);
    ThresholdConfig::new(threshold)?.classify(model, &row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::RecordPolicy;
    use crate::logic::error::PipelineError;
    use crate::logic::model::testing::fixture_handle;
    use crate::logic::model::ModelGateway;

    fn pipeline(config: &PipelineConfig) -> CreditPipeline {
        CreditPipeline::new(Arc::new(fixture_handle()), config).unwrap()
    }

    #[test]
    fn test_sample_assessment() {
        let p = pipeline(&PipelineConfig::default());
        let assessment = p.assess(&RawRecord::sample()).unwrap();

        assert!((0.0..=1.0).contains(&assessment.prediction.probability));
        assert_eq!(assessment.prediction.prediction, 1);
        assert!(assessment.audit.is_clean());
        assert!(
            (assessment.explanation.reconstructed_margin() - assessment.explanation.margin).abs() < 1e-9
        );
    }

    #[test]
    fn test_threshold_from_config() {
        let strict = pipeline(&PipelineConfig::default().with_threshold(0.9));
        let scored = strict.predict(&RawRecord::sample()).unwrap();
        assert_eq!(scored.prediction.prediction, 0);
        assert_eq!(scored.prediction.threshold, 0.9);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let result = CreditPipeline::new(
            Arc::new(fixture_handle()),
            &PipelineConfig::default().with_threshold(-0.1),
        );
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_predict_is_deterministic() {
        let p = pipeline(&PipelineConfig::default());
        let first = p.predict(&RawRecord::sample()).unwrap();
        let second = p.predict(&RawRecord::sample()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fallback_reported_to_caller() {
        let p = pipeline(&PipelineConfig::default());
        let scored = p.predict(&RawRecord::sample().with("AGE", "n/a")).unwrap();
        assert_eq!(scored.audit.filled_fields(), vec!["AGE"]);
    }

    #[test]
    fn test_strict_policy_fails_request() {
        let p = pipeline(&PipelineConfig::default().with_record_policy(RecordPolicy::strict()));
        let mut raw = RawRecord::sample();
        raw.remove("LIMIT_BAL");
        assert!(matches!(p.assess(&raw), Err(PipelineError::MalformedRecord(_))));
    }

    #[test]
    fn test_predict_single_matches_pipeline() {
        let handle = fixture_handle();
        let single = predict_single(&RawRecord::sample(), &handle, 0.5).unwrap();
        let scored = pipeline(&PipelineConfig::default()).predict(&RawRecord::sample()).unwrap();
        assert_eq!(single, scored.prediction);
    }

    #[test]
    fn test_from_gateway_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = ModelGateway::new(dir.path().join("final_xgb_model.json"));
        let result = CreditPipeline::from_gateway(&gateway, &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::ArtifactMissing(_))));
    }

    #[test]
    fn test_global_importance_from_pipeline() {
        let p = pipeline(&PipelineConfig::default());
        let importance = p.global_importance();
        assert_eq!(importance.top_n(crate::constants::DEFAULT_IMPORTANCE_TOP_N).len(), 15);
    }
}

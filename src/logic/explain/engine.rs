//! Explanation Engine
//!
//! Stable seam over the attribution algorithm. The pipeline only sees
//! `Explainer`; TreeSHAP is the implementation used for tree ensembles.
//! Both operations are read-only traversals of the model.

use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::{FeatureRow, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::model::ModelHandle;
use super::importance::compute_importance;
use super::tree_shap::ensemble_shap;
use super::types::{Explanation, FeatureContribution, FeatureImportance, ImportanceType};

/// Trait for explainers (TreeSHAP, stubs, future methods)
pub trait Explainer {
    /// Decompose the model margin for one row
    fn explain(&self, model: &ModelHandle, row: &FeatureRow) -> PipelineResult<Explanation>;

    /// One score per feature for the whole model
    fn global_importance(&self, model: &ModelHandle) -> FeatureImportance;
}

/// TreeSHAP local attributions + split-statistic importance
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeShapExplainer {
    importance_type: ImportanceType,
}

impl TreeShapExplainer {
    pub fn new(importance_type: ImportanceType) -> Self {
        Self { importance_type }
    }

    pub fn importance_type(&self) -> ImportanceType {
        self.importance_type
    }
}

impl Explainer for TreeShapExplainer {
    fn explain(&self, model: &ModelHandle, row: &FeatureRow) -> PipelineResult<Explanation> {
        model
            .check_row(row)
            .map_err(|e| PipelineError::Explanation(e.to_string()))?;

        let ensemble = model.ensemble();
        let x = row.as_slice();
        let phi = ensemble_shap(ensemble, x).map_err(PipelineError::Explanation)?;

        let attributions = FEATURE_LAYOUT
            .iter()
            .zip(x.iter())
            .zip(phi)
            .map(|((name, &value), contribution)| FeatureContribution {
                name: name.to_string(),
                value,
                contribution,
            })
            .collect();

        let explanation = Explanation {
            baseline: ensemble.expected_margin(),
            margin: ensemble.margin(x),
            attributions,
        };

        let drift = (explanation.reconstructed_margin() - explanation.margin).abs();
        if drift > 1e-6 * explanation.margin.abs().max(1.0) {
            log::warn!("Attributions miss the model margin by {:e}", drift);
        }

        Ok(explanation)
    }

    /// Normalized so scores sum to 1, matching XGBoost's `feature_importances_`
    fn global_importance(&self, model: &ModelHandle) -> FeatureImportance {
        let ensemble = model.ensemble();
        let names: Vec<String> = if !ensemble.feature_names().is_empty() {
            ensemble.feature_names().to_vec()
        } else if ensemble.num_features() == FEATURE_COUNT {
            FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        compute_importance(ensemble, &names, self.importance_type).normalized()
    }
}

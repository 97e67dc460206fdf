//! Inference Engine - XGBoost tree ensemble
//!
//! Loads the model artifact once and scores feature rows. The handle is
//! immutable after load, so it can be shared freely across threads.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::layout::{validate_feature_names, FEATURE_COUNT, FEATURE_VERSION, layout_hash};
use crate::logic::features::FeatureRow;
use super::ensemble::TreeEnsemble;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub objective: String,
    pub tree_count: usize,
    pub feature_count: usize,
    pub base_score: f64,
    /// SHA-256 of the artifact bytes
    pub checksum: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    /// Artifact columns match the feature layout
    pub layout_compatible: bool,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Probability model seam (tree ensemble, stubs in tests)
pub trait Classifier {
    /// Raw (pre-sigmoid) output
    fn predict_margin(&self, row: &FeatureRow) -> PipelineResult<f64>;

    /// Probability of default, in [0, 1]
    fn predict_proba(&self, row: &FeatureRow) -> PipelineResult<f64> {
        let margin = self.predict_margin(row)?;
        Ok(super::ensemble::sigmoid(margin))
    }
}

// ============================================================================
// MODEL HANDLE
// ============================================================================

/// Loaded, read-only model
#[derive(Debug, Clone)]
pub struct ModelHandle {
    ensemble: TreeEnsemble,
    metadata: ModelMetadata,
    /// (expected, actual) when the artifact's columns differ from the layout
    layout_mismatch: Option<(String, String)>,
}

impl ModelHandle {
    /// Load an XGBoost JSON artifact from disk
    ///
    /// Never falls back to a default model: an absent file is
    /// `ArtifactMissing`, anything unreadable is `ArtifactCorrupt`.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        log::info!("Loading model from: {}", path.display());

        if !path.exists() {
            return Err(PipelineError::ArtifactMissing(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|e| corrupt(path, e.to_string()))?;
        let handle = Self::from_bytes(&bytes, path)?;

        log::info!(
            "Model loaded: {} trees, {} features, objective {}, sha256 {}",
            handle.metadata.tree_count,
            handle.metadata.feature_count,
            handle.metadata.objective,
            handle.metadata.checksum
        );

        Ok(handle)
    }

    /// Parse artifact bytes; `source` is only used for metadata and errors
    pub fn from_bytes(bytes: &[u8], source: &Path) -> PipelineResult<Self> {
        let ensemble = TreeEnsemble::from_xgboost_json(bytes).map_err(|reason| corrupt(source, reason))?;
        let checksum = hex::encode(Sha256::digest(bytes));
        Ok(Self::with_checksum(ensemble, source.display().to_string(), checksum))
    }

    /// Wrap an in-memory ensemble (stub models, tests)
    pub fn from_ensemble(ensemble: TreeEnsemble, name: &str) -> Self {
        Self::with_checksum(ensemble, name.to_string(), String::new())
    }

    fn with_checksum(ensemble: TreeEnsemble, model_path: String, checksum: String) -> Self {
        let layout_mismatch = layout_mismatch(&ensemble);
        if let Some((expected, actual)) = &layout_mismatch {
            log::warn!(
                "Model {} does not match feature layout v{}: model expects {}, layout has {}",
                model_path,
                FEATURE_VERSION,
                expected,
                actual
            );
        }

        let metadata = ModelMetadata {
            model_path,
            objective: ensemble.objective().name().to_string(),
            tree_count: ensemble.trees().len(),
            feature_count: ensemble.num_features(),
            base_score: ensemble.base_score(),
            checksum,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            layout_compatible: layout_mismatch.is_none(),
            loaded_at: chrono::Utc::now(),
        };
        Self { ensemble, metadata, layout_mismatch }
    }

    pub fn ensemble(&self) -> &TreeEnsemble {
        &self.ensemble
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Check that a row can be fed to this model
    pub fn check_row(&self, row: &FeatureRow) -> PipelineResult<()> {
        if row.len() != self.ensemble.num_features() {
            return Err(PipelineError::column_count(self.ensemble.num_features(), row.len()));
        }
        if !row.is_compatible() {
            return Err(PipelineError::FeatureShape {
                expected: format!("layout v{} ({:08x})", FEATURE_VERSION, layout_hash()),
                actual: format!("layout v{} ({:08x})", row.version, row.layout_hash),
            });
        }
        if let Some((expected, actual)) = &self.layout_mismatch {
            return Err(PipelineError::FeatureShape {
                expected: expected.clone(),
                actual: actual.clone(),
            });
        }
        Ok(())
    }
}

/// Compare the artifact's columns with the layout once, at load
fn layout_mismatch(ensemble: &TreeEnsemble) -> Option<(String, String)> {
    let check = if !ensemble.feature_names().is_empty() {
        validate_feature_names(ensemble.feature_names())
    } else if ensemble.num_features() != FEATURE_COUNT {
        Err(PipelineError::column_count(ensemble.num_features(), FEATURE_COUNT))
    } else {
        Ok(())
    };

    match check {
        Ok(()) => None,
        Err(PipelineError::FeatureShape { expected, actual }) => Some((expected, actual)),
        Err(other) => Some((format!("layout v{}", FEATURE_VERSION), other.to_string())),
    }
}

impl Classifier for ModelHandle {
    fn predict_margin(&self, row: &FeatureRow) -> PipelineResult<f64> {
        self.check_row(row)?;
        Ok(self.ensemble.margin(row.as_slice()))
    }
}

fn corrupt(path: &Path, reason: String) -> PipelineError {
    PipelineError::ArtifactCorrupt {
        path: PathBuf::from(path),
        reason,
    }
}

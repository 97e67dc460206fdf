//! Error handling
//!
//! Only structural failures live here. A field that fails numeric coercion is
//! not an error; see `record::normalize::CoercionFallback`.

use std::path::PathBuf;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    // Model artifact errors
    #[error("model artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("model artifact at {} is unreadable: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    // Record errors
    #[error("record is missing required field `{0}`")]
    MalformedRecord(String),

    #[error("record contains unknown field `{0}`")]
    UnknownField(String),

    // Shape errors
    #[error("feature shape mismatch: model expects {expected}, row has {actual}")]
    FeatureShape { expected: String, actual: String },

    #[error("explanation failed: {0}")]
    Explanation(String),

    // Configuration errors
    #[error("invalid configuration: {0}")]
    Config(String),

    // Dataset errors
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Shape mismatch expressed as column counts
    pub fn column_count(expected: usize, actual: usize) -> Self {
        PipelineError::FeatureShape {
            expected: format!("{} columns", expected),
            actual: format!("{} columns", actual),
        }
    }

    /// True for failures caused by the model artifact itself
    pub fn is_artifact_error(&self) -> bool {
        matches!(
            self,
            PipelineError::ArtifactMissing(_) | PipelineError::ArtifactCorrupt { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_error_classification() {
        assert!(PipelineError::ArtifactMissing(PathBuf::from("x.json")).is_artifact_error());
        assert!(!PipelineError::MalformedRecord("AGE".into()).is_artifact_error());
    }

    #[test]
    fn test_column_count_message() {
        let err = PipelineError::column_count(48, 47);
        assert_eq!(
            err.to_string(),
            "feature shape mismatch: model expects 48 columns, row has 47 columns"
        );
    }
}

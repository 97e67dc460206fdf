//! Model Module - Tree ensemble inference
//!
//! Artifact parsing, scoring, thresholding and the load-once gateway.

pub mod ensemble;
pub mod inference;
pub mod threshold;
pub mod gateway;

#[cfg(test)]
pub(crate) mod testing;

// Re-export common types
pub use ensemble::{TreeEnsemble, Tree, Node, Objective, sigmoid};
pub use inference::{Classifier, ModelHandle, ModelMetadata};
pub use threshold::{Prediction, RiskLevel, ThresholdConfig, decide};
pub use gateway::ModelGateway;

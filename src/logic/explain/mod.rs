//! Explain Module - Why the model decided what it decided
//!
//! Local: TreeSHAP attributions in margin space, aligned to the feature row.
//! Global: per-feature split statistics. Ranking and top-N cut-offs belong
//! to whoever renders the result.

pub mod types;
pub mod tree_shap;
pub mod importance;
pub mod engine;

#[cfg(test)]
mod tests;

pub use types::{Explanation, FeatureContribution, FeatureImportance, ImportanceScore, ImportanceType};
pub use engine::{Explainer, TreeShapExplainer};

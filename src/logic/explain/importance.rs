//! Global Feature Importance
//!
//! Aggregates split statistics over every tree, independent of any input
//! row. Features the ensemble never splits on score 0.

use crate::logic::model::TreeEnsemble;
use super::types::{FeatureImportance, ImportanceScore, ImportanceType};

/// Raw (unnormalized) importance per feature, in column order
pub fn compute_importance(
    ensemble: &TreeEnsemble,
    names: &[String],
    importance_type: ImportanceType,
) -> FeatureImportance {
    let n = ensemble.num_features();
    let mut splits = vec![0usize; n];
    let mut gain = vec![0.0f64; n];
    let mut cover = vec![0.0f64; n];

    for tree in ensemble.trees() {
        for node in tree.nodes().iter().filter(|node| !node.is_leaf()) {
            splits[node.feature] += 1;
            gain[node.feature] += node.gain;
            cover[node.feature] += node.cover;
        }
    }

    let mean = |total: f64, count: usize| if count > 0 { total / count as f64 } else { 0.0 };

    let scores = (0..n)
        .map(|i| {
            let score = match importance_type {
                ImportanceType::Weight => splits[i] as f64,
                ImportanceType::Gain => mean(gain[i], splits[i]),
                ImportanceType::TotalGain => gain[i],
                ImportanceType::Cover => mean(cover[i], splits[i]),
                ImportanceType::TotalCover => cover[i],
            };
            ImportanceScore {
                feature: names.get(i).cloned().unwrap_or_else(|| format!("f{}", i)),
                score,
            }
        })
        .collect();

    FeatureImportance { importance_type, scores }
}

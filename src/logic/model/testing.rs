//! Test fixtures: XGBoost JSON documents

use std::path::{Path, PathBuf};
use serde_json::{json, Value};

use crate::logic::features::FEATURE_LAYOUT;
use super::inference::ModelHandle;

/// Three-tree model over the full feature layout
pub const FIXTURE_MODEL: &str = include_str!("../../../tests/fixtures/tiny_xgb_model.json");

pub fn fixture_handle() -> ModelHandle {
    ModelHandle::from_bytes(FIXTURE_MODEL.as_bytes(), Path::new("tiny_xgb_model.json"))
        .expect("fixture model parses")
}

/// Single-leaf model: margin is always `leaf`
pub fn constant_model(leaf: f64) -> Value {
    json!({
        "learner": {
            "feature_names": FEATURE_LAYOUT,
            "gradient_booster": {
                "name": "gbtree",
                "model": {
                    "trees": [{
                        "left_children": [-1],
                        "right_children": [-1],
                        "split_indices": [0],
                        "split_conditions": [leaf],
                        "default_left": [false],
                        "sum_hessian": [1.0],
                        "loss_changes": [0.0]
                    }]
                }
            },
            "learner_model_param": {
                "base_score": "5E-1",
                "num_class": "0",
                "num_feature": FEATURE_LAYOUT.len().to_string()
            },
            "objective": { "name": "binary:logistic" }
        }
    })
}

pub fn write_model(dir: &Path, doc: &Value) -> PathBuf {
    let path = dir.join("model.json");
    std::fs::write(&path, doc.to_string()).expect("write model fixture");
    path
}

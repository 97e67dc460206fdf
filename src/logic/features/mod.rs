//! Features Module - Feature Engineering Engine
//!
//! Turns a normalized row into the ordered feature row the model was trained
//! on. Each engineered group lives in its own file and writes itself into the
//! row through `FeatureExtractor`.

pub mod layout;
pub mod vector;
pub mod stats;
pub mod delay;
pub mod bill;
pub mod payment;
pub mod composite;
pub mod derive;


// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, feature_index, feature_name};
pub use vector::{FeatureRow, FeatureExtractor};
pub use derive::{FeatureDeriver, derive_features};

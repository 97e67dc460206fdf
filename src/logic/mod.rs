//! Logic Module - Inference Engines
//!
//! ## Architecture
//! - `record/` - RawRecord + RecordNormalizer
//! - `features/` - Feature layout, FeatureRow, FeatureDeriver
//! - `model/` - Tree ensemble artifact, inference, lazy gateway
//! - `explain/` - TreeSHAP local attributions, global importance
//! - `dataset/` - Offline spreadsheet conversion and batch features

pub mod error;
pub mod config;

pub mod record;
pub mod features;
pub mod model;
pub mod explain;
pub mod dataset;

pub mod pipeline;

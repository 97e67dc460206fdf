//! Credit Risk Core - Inference Engine
//!
//! Turns one customer's raw credit-account record into a default probability,
//! a thresholded decision and a per-feature explanation.
//!
//! ## Pipeline
//! - `logic::record` - raw record parsing and normalization
//! - `logic::features` - feature layout and derived features
//! - `logic::model` - tree ensemble loading and inference
//! - `logic::explain` - TreeSHAP attributions and global importance
//! - `logic::pipeline` - composition root tying the stages together
//! - `logic::dataset` - offline spreadsheet conversion and feature tables

pub mod constants;
pub mod logic;

pub use logic::error::{PipelineError, PipelineResult};
pub use logic::pipeline::CreditPipeline;

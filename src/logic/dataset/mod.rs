//! Dataset Module - Offline data preparation
//!
//! Not part of request-time inference. Converts the legacy spreadsheet export
//! into a flat CSV and turns that CSV into an engineered feature matrix.

pub mod convert;
pub mod batch;


pub use convert::{convert_xls_to_csv, HEADER_ROW};
pub use batch::{derive_matrix, is_target_column, load_raw_csv, normalize_all, write_feature_csv, TARGET_COLUMNS};

//! Batch feature engineering
//!
//! Processed CSV → RawRecords → NormalizedRows → feature matrix. Used to
//! build training tables; scoring stays one record at a time.

use std::path::Path;
use ndarray::{Array2, ArrayView1};
use serde_json::{Number, Value};

use crate::logic::error::{PipelineError, PipelineResult};
use crate::logic::features::{FeatureDeriver, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::record::{is_identifier_field, NormalizedRow, RawRecord, RecordNormalizer};

/// Label columns found in the public dataset exports
pub const TARGET_COLUMNS: &[&str] = &[
    "default payment next month",
    "default.payment.next.month",
    "default",
];

pub fn is_target_column(name: &str) -> bool {
    TARGET_COLUMNS.iter().any(|t| t.eq_ignore_ascii_case(name.trim()))
}

/// Read a processed CSV into records, one per data row.
/// Identifier and label columns are left out.
pub fn load_raw_csv(path: impl AsRef<Path>) -> PipelineResult<Vec<RawRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let keep: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !is_identifier_field(name) && !is_target_column(name))
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let record = RawRecord::from_pairs(
            keep.iter()
                .map(|&(i, name)| (name, parse_cell(row.get(i).unwrap_or("")))),
        );
        records.push(record);
    }

    log::info!(
        "Loaded {} records with {} columns from {}",
        records.len(),
        keep.len(),
        path.display()
    );
    Ok(records)
}

fn parse_cell(cell: &str) -> Value {
    cell.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}

/// Normalize every record; the first structural failure aborts the batch
pub fn normalize_all(records: &[RawRecord], normalizer: &RecordNormalizer) -> PipelineResult<Vec<NormalizedRow>> {
    let mut rows = Vec::with_capacity(records.len());
    let mut filled = 0;

    for record in records {
        let normalized = normalizer.normalize(record)?;
        filled += normalized.audit.fallbacks.len();
        rows.push(normalized.row);
    }

    if filled > 0 {
        log::warn!("{} field value(s) across {} records filled with 0", filled, records.len());
    }
    Ok(rows)
}

/// One FeatureRow per input row, in FEATURE_LAYOUT column order
pub fn derive_matrix(rows: &[NormalizedRow]) -> Array2<f64> {
    let deriver = FeatureDeriver::new();
    let mut matrix = Array2::zeros((rows.len(), FEATURE_COUNT));

    for (i, row) in rows.iter().enumerate() {
        let features = deriver.derive(row);
        matrix.row_mut(i).assign(&ArrayView1::from(features.as_slice()));
    }
    matrix
}

/// Write a feature matrix with the layout names as header.
/// Returns the number of rows written.
pub fn write_feature_csv(path: impl AsRef<Path>, matrix: &Array2<f64>) -> PipelineResult<usize> {
    if matrix.ncols() != FEATURE_COUNT {
        return Err(PipelineError::column_count(FEATURE_COUNT, matrix.ncols()));
    }

    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_path(path)?;
    writer.write_record(FEATURE_LAYOUT)?;

    for row in matrix.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;

    log::info!("Wrote {} feature rows to {}", matrix.nrows(), path.display());
    Ok(matrix.nrows())
}

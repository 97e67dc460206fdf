//! Spreadsheet → CSV conversion
//!
//! The source workbook carries a banner in its first row; column names live
//! on the second row. Only the first sheet is read.

use std::path::Path;
use calamine::{open_workbook_auto, Data, Reader};

use crate::logic::error::{PipelineError, PipelineResult};

/// Zero-based row holding the column names
pub const HEADER_ROW: usize = 1;

/// Convert the first sheet of `input` into a comma-delimited CSV at `output`.
/// Returns the number of data rows written (header excluded).
pub fn convert_xls_to_csv(input: impl AsRef<Path>, output: impl AsRef<Path>) -> PipelineResult<usize> {
    let input = input.as_ref();
    let output = output.as_ref();

    let mut workbook = open_workbook_auto(input)
        .map_err(|e| PipelineError::Spreadsheet(format!("{}: {}", input.display(), e)))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PipelineError::Spreadsheet(format!("{}: workbook has no sheets", input.display())))?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| PipelineError::Spreadsheet(format!("{}: sheet `{}`: {}", input.display(), sheet, e)))?;

    let mut rows = range.rows().skip(HEADER_ROW);
    let header = rows.next().ok_or_else(|| {
        PipelineError::Spreadsheet(format!("{}: sheet `{}` has no header row", input.display(), sheet))
    })?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(header.iter().map(cell_to_string))?;

    let mut count = 0;
    for row in rows {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        writer.write_record(row.iter().map(cell_to_string))?;
        count += 1;
    }
    writer.flush()?;

    log::info!("Converted {} rows from {} (sheet `{}`) to {}", count, input.display(), sheet, output.display());
    Ok(count)
}

/// Render one cell the way it should appear in the CSV
pub(crate) fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        // Whole floats are written without a fractional part
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => u8::from(*b).to_string(),
        Data::Error(e) => {
            log::warn!("Spreadsheet cell error {:?} written as empty", e);
            String::new()
        }
        other => other.to_string(),
    }
}

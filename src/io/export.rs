//! Exports: the derived series as CSV, a whole render pass as JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts;
//! the JSON carries every panel, including the reason an unavailable one is empty.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::app::pipeline::ViewModel;
use crate::error::AppError;
use crate::series::DerivedSeries;

pub const CSV_HEADER: &str = "date,open,high,low,close,adj_close,volume,change";

/// Write the series with its change column to a CSV file.
pub fn write_series_csv(path: &Path, series: &DerivedSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_series_csv_to(&mut out, series)?;
    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))
}

/// CSV body for `series`; the missing first change is an empty field.
pub fn write_series_csv_to<W: Write>(mut w: W, series: &DerivedSeries) -> Result<(), AppError> {
    writeln!(w, "{CSV_HEADER}")
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for r in &series.rows {
        writeln!(
            w,
            "{},{},{},{},{},{},{},{}",
            r.date,
            r.open,
            r.high,
            r.low,
            r.close,
            r.adj_close,
            r.volume,
            r.change.map(|c| c.to_string()).unwrap_or_default(),
        )
        .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

/// Write the full view model as pretty-printed JSON.
pub fn write_view_json(path: &Path, vm: &ViewModel) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), vm)
        .map_err(|e| AppError::io(format!("Failed to write export JSON: {e}")))
}

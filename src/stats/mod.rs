//! Statistics engine.
//!
//! - `describe` / `correlate` run on the full derived series
//! - `extrema` and the return metrics run on the clean series

pub mod describe;
pub mod extrema;
pub mod returns;

pub use describe::*;
pub use extrema::*;
pub use returns::*;

use serde::Serialize;

use crate::error::AppError;
use crate::series::CleanSeries;

/// Contents of the "Result" panel: the extrema table plus scalar metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsPanel {
    pub extrema: ExtremaTable,
    pub metrics: ReturnMetrics,
}

/// Compute the results panel, or `DegenerateStatistics` when the clean
/// series is empty.
pub fn results(clean: &CleanSeries) -> Result<ResultsPanel, AppError> {
    let extrema = extrema(clean)?;
    let metrics = ReturnMetrics::compute(clean)?;
    Ok(ResultsPanel { extrema, metrics })
}

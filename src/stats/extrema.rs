//! Per-column maxima/minima and the dates they occurred on.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::Column;
use crate::error::AppError;
use crate::series::CleanSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremumKind {
    Max,
    Min,
}

impl ExtremumKind {
    pub fn key(self) -> &'static str {
        match self {
            ExtremumKind::Max => "max",
            ExtremumKind::Min => "min",
        }
    }
}

/// One row of the extrema table, e.g. `adj_close_max = 187.3 on 2024-03-07`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremumRow {
    pub feature: String,
    pub column: Column,
    pub kind: ExtremumKind,
    pub value: f64,
    pub date: NaiveDate,
}

/// Twelve rows: max then min for each tracked column, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremaTable {
    pub rows: Vec<ExtremumRow>,
}

impl ExtremaTable {
    pub fn get(&self, column: Column, kind: ExtremumKind) -> Option<&ExtremumRow> {
        self.rows.iter().find(|r| r.column == column && r.kind == kind)
    }

    pub fn value(&self, column: Column, kind: ExtremumKind) -> Option<f64> {
        self.get(column, kind).map(|r| r.value)
    }
}

/// Locate the max and min of every tracked column.
///
/// Ties resolve to the earliest date. An empty series has no row to point
/// at, which is reported as `DegenerateStatistics` instead of a lookup fault.
pub fn extrema(clean: &CleanSeries) -> Result<ExtremaTable, AppError> {
    if clean.is_empty() {
        return Err(AppError::degenerate(
            "Not enough trading days in the selected range to compute results.",
        ));
    }

    let dates = clean.dates();
    let mut rows = Vec::with_capacity(Column::TRACKED.len() * 2);

    for column in Column::TRACKED {
        let values = clean.column(column);
        for kind in [ExtremumKind::Max, ExtremumKind::Min] {
            let idx = first_extremum(&values, kind).ok_or_else(|| {
                AppError::degenerate(format!("No values to rank in column {}.", column.label()))
            })?;
            rows.push(ExtremumRow {
                feature: format!("{}_{}", column.key(), kind.key()),
                column,
                kind,
                value: values[idx],
                date: dates[idx],
            });
        }
    }

    Ok(ExtremaTable { rows })
}

fn first_extremum(values: &[f64], kind: ExtremumKind) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        let better = match best {
            None => true,
            Some(b) => match kind {
                ExtremumKind::Max => v > values[b],
                ExtremumKind::Min => v < values[b],
            },
        };
        if better {
            best = Some(i);
        }
    }
    best
}

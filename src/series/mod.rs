//! Derived series: the raw OHLCV history plus the daily `change` column.
//!
//! - [`DerivedSeries`] keeps every input row; `change` is missing on the first
//!   row because there is no prior close to compare against.
//! - [`CleanSeries`] drops every row with a missing value, which in practice
//!   means the first row. Extrema and return metrics run on it so the undefined
//!   first change never skews them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Column, OhlcvSeries};

/// One row of the derived table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
    /// `adj_close[i] / adj_close[i-1] - 1`; `None` on the first row.
    pub change: Option<f64>,
}

impl DerivedRow {
    pub fn value(&self, column: Column) -> Option<f64> {
        let v = match column {
            Column::Open => self.open,
            Column::High => self.high,
            Column::Low => self.low,
            Column::Close => self.close,
            Column::AdjClose => self.adj_close,
            Column::Volume => self.volume as f64,
            Column::Change => return self.change.filter(|c| c.is_finite()),
        };
        v.is_finite().then_some(v)
    }

    fn is_complete(&self) -> bool {
        Column::ALL.iter().all(|&c| self.value(c).is_some())
    }
}

/// OHLCV history with the `change` column appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub ticker: String,
    pub rows: Vec<DerivedRow>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column values in row order, missing entries kept as `None`.
    pub fn column(&self, column: Column) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.value(column)).collect()
    }

    /// Rows with every column defined.
    pub fn clean(&self) -> CleanSeries {
        CleanSeries {
            ticker: self.ticker.clone(),
            rows: self.rows.iter().filter(|r| r.is_complete()).cloned().collect(),
        }
    }
}

/// A derived series with no missing values in any column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanSeries {
    pub ticker: String,
    rows: Vec<DerivedRow>,
}

impl CleanSeries {
    pub fn rows(&self) -> &[DerivedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column values in row order. Every value is defined by construction.
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.value(column)).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }
}

/// Append the fractional daily change of adjusted close.
///
/// An empty input yields an empty output. A zero previous close would divide
/// by zero; that row gets a missing change instead of an infinity.
pub fn derive(series: &OhlcvSeries) -> DerivedSeries {
    let mut rows = Vec::with_capacity(series.len());
    let mut prev_adj: Option<f64> = None;

    for r in &series.rows {
        let change = prev_adj.and_then(|prev| {
            let c = r.adj_close / prev - 1.0;
            c.is_finite().then_some(c)
        });
        rows.push(DerivedRow {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            adj_close: r.adj_close,
            volume: r.volume,
            change,
        });
        prev_adj = Some(r.adj_close);
    }

    DerivedSeries {
        ticker: series.ticker.clone(),
        rows,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::OhlcvRow;

    /// Flat OHLC rows at the given adjusted closes, one calendar day apart.
    pub(crate) fn series_from_adj(adj: &[f64]) -> OhlcvSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let rows = adj
            .iter()
            .enumerate()
            .map(|(i, &a)| OhlcvRow {
                date: start + chrono::Duration::days(i as i64),
                open: a,
                high: a + 1.0,
                low: a - 1.0,
                close: a,
                adj_close: a,
                volume: 1_000 + i as u64,
            })
            .collect();
        OhlcvSeries::new("TEST", rows)
    }

    #[test]
    fn change_column_matches_formula() {
        let derived = derive(&series_from_adj(&[100.0, 110.0, 99.0]));
        assert_eq!(derived.len(), 3);
        assert_eq!(derived.rows[0].change, None);
        assert!((derived.rows[1].change.unwrap() - 0.10).abs() < 1e-12);
        assert!((derived.rows[2].change.unwrap() + 0.10).abs() < 1e-12);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let derived = derive(&OhlcvSeries::empty("NONE"));
        assert!(derived.is_empty());
        assert!(derived.clean().is_empty());
    }

    #[test]
    fn clean_drops_leading_missing_change() {
        let derived = derive(&series_from_adj(&[100.0, 110.0, 99.0]));
        let clean = derived.clean();
        assert_eq!(clean.len(), 2);
        assert_eq!(clean.dates()[0], derived.rows[1].date);
        assert_eq!(clean.column(Column::Change).len(), 2);
    }

    #[test]
    fn single_row_has_no_clean_rows() {
        let derived = derive(&series_from_adj(&[100.0]));
        assert_eq!(derived.len(), 1);
        assert!(derived.clean().is_empty());
    }

    #[test]
    fn zero_previous_close_gives_missing_change() {
        let derived = derive(&series_from_adj(&[0.0, 5.0, 10.0]));
        assert_eq!(derived.rows[1].change, None);
        assert!((derived.rows[2].change.unwrap() - 1.0).abs() < 1e-12);
    }
}

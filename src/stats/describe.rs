//! Column summaries and pairwise correlation over the full derived series.
//!
//! Missing values (the first `change`) are skipped per column, and per pair
//! for correlation, so one undefined cell never poisons a whole column.

use nalgebra::DMatrix;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::domain::Column;
use crate::math::{mean, pearson, quantile, std_dev};
use crate::series::DerivedSeries;

/// `describe()`-style summary of one numeric column.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ColumnSummary {
    pub column: Column,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// Summarize every numeric column: count, mean, sample std, min, quartiles, max.
pub fn describe(series: &DerivedSeries) -> Vec<ColumnSummary> {
    Column::ALL
        .iter()
        .map(|&column| {
            let values: Vec<f64> = series.column(column).into_iter().flatten().collect();
            ColumnSummary {
                column,
                count: values.len(),
                mean: mean(&values),
                std: std_dev(&values, 1),
                min: quantile(&values, 0.0),
                p25: quantile(&values, 0.25),
                p50: quantile(&values, 0.5),
                p75: quantile(&values, 0.75),
                max: quantile(&values, 1.0),
            }
        })
        .collect()
}

/// Symmetric Pearson correlation matrix, undefined cells stored as NaN.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    values: DMatrix<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let v = *self.values.get((row, col))?;
        v.is_finite().then_some(v)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn row(&self, row: usize) -> Vec<Option<f64>> {
        (0..self.len()).map(|c| self.get(row, c)).collect()
    }
}

impl Serialize for CorrelationMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<Option<f64>>> = (0..self.len()).map(|r| self.row(r)).collect();
        let mut s = serializer.serialize_struct("CorrelationMatrix", 2)?;
        s.serialize_field("columns", &self.columns)?;
        s.serialize_field("values", &rows)?;
        s.end()
    }
}

/// Pairwise-complete Pearson correlation over all numeric columns.
///
/// The diagonal is always 1.0; an off-diagonal cell is undefined when the pair
/// shares fewer than two rows or either side is constant over them.
pub fn correlate(series: &DerivedSeries) -> CorrelationMatrix {
    let columns = Column::ALL.to_vec();
    let data: Vec<Vec<Option<f64>>> = columns.iter().map(|&c| series.column(c)).collect();
    let n = columns.len();

    let mut values = DMatrix::from_element(n, n, f64::NAN);
    for i in 0..n {
        values[(i, i)] = 1.0;
        for j in (i + 1)..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = data[i]
                .iter()
                .zip(&data[j])
                .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                .unzip();
            let r = pearson(&xs, &ys).unwrap_or(f64::NAN);
            values[(i, j)] = r;
            values[(j, i)] = r;
        }
    }

    CorrelationMatrix { columns, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::derive;
    use crate::series::tests::series_from_adj;

    #[test]
    fn describe_skips_missing_change() {
        let derived = derive(&series_from_adj(&[100.0, 110.0, 99.0]));
        let summary = describe(&derived);

        let adj = summary.iter().find(|s| s.column == Column::AdjClose).unwrap();
        assert_eq!(adj.count, 3);
        assert!((adj.mean.unwrap() - 103.0).abs() < 1e-12);
        assert_eq!(adj.min, Some(99.0));
        assert_eq!(adj.max, Some(110.0));
        assert_eq!(adj.p50, Some(100.0));

        let change = summary.iter().find(|s| s.column == Column::Change).unwrap();
        assert_eq!(change.count, 2);
        assert!(change.mean.unwrap().abs() < 1e-12);
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let derived = derive(&series_from_adj(&[100.0, 104.0, 99.0, 120.0, 118.0]));
        let corr = correlate(&derived);
        assert_eq!(corr.len(), Column::ALL.len());
        for i in 0..corr.len() {
            assert_eq!(corr.get(i, i), Some(1.0));
            for j in 0..corr.len() {
                assert_eq!(corr.get(i, j), corr.get(j, i));
            }
        }
        // open and close move together exactly in the fixture
        assert!((corr.get(0, 3).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_with_constant_column_is_undefined() {
        let derived = derive(&series_from_adj(&[50.0, 50.0, 50.0]));
        let corr = correlate(&derived);
        assert_eq!(corr.get(0, 1), None);
        assert_eq!(corr.get(0, 0), Some(1.0));
    }
}

//! Aggregate return, volatility and the risk-adjusted ratio.
//!
//! These follow the dashboard's informal conventions rather than textbook
//! finance:
//!
//! - total return is the *sum* of daily changes, in percent (no compounding)
//! - volatility scales the population std of daily changes by `sqrt(n)`,
//!   where `n` is the number of observations, not a 252-day year
//!
//! Values are stored unrounded; [`ReturnMetrics`] exposes rounded views for display.

use serde::Serialize;

use crate::domain::Column;
use crate::error::AppError;
use crate::math::{mean, round_to, std_dev};
use crate::series::CleanSeries;

/// `mean(change) * count(change) * 100`.
pub fn aggregate_return(clean: &CleanSeries) -> Result<f64, AppError> {
    let changes = clean.column(Column::Change);
    let m = mean(&changes).ok_or_else(|| AppError::degenerate("No daily changes to aggregate."))?;
    Ok(m * changes.len() as f64 * 100.0)
}

/// `std(change, ddof = 0) * sqrt(count(change))`.
pub fn volatility(clean: &CleanSeries) -> Result<f64, AppError> {
    let changes = clean.column(Column::Change);
    let sd = std_dev(&changes, 0)
        .ok_or_else(|| AppError::degenerate("No daily changes to measure volatility."))?;
    Ok(sd * (changes.len() as f64).sqrt())
}

/// `aggregate_return / (volatility * 100)`; zero volatility has no ratio.
pub fn risk_adjusted_return(aggregate_return: f64, volatility: f64) -> Result<f64, AppError> {
    let denom = volatility * 100.0;
    if denom == 0.0 || !denom.is_finite() {
        return Err(AppError::degenerate(
            "Volatility is zero over the selected range; the risk-adjusted return is undefined.",
        ));
    }
    Ok(aggregate_return / denom)
}

/// The three scalar results shown under the extrema table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnMetrics {
    pub total_return_pct: f64,
    pub volatility: f64,
    /// `None` when volatility is zero.
    pub risk_ratio: Option<f64>,
}

impl ReturnMetrics {
    pub fn compute(clean: &CleanSeries) -> Result<Self, AppError> {
        let total_return_pct = aggregate_return(clean)?;
        let volatility = volatility(clean)?;
        let risk_ratio = match risk_adjusted_return(total_return_pct, volatility) {
            Ok(r) => Some(r),
            Err(err) => {
                log::debug!("risk ratio unavailable: {err}");
                None
            }
        };
        Ok(Self {
            total_return_pct,
            volatility,
            risk_ratio,
        })
    }

    pub fn display_return(&self) -> String {
        format!("{}%", round_to(self.total_return_pct, 2))
    }

    pub fn display_volatility(&self) -> String {
        format!("{}", round_to(self.volatility, 4))
    }

    pub fn display_risk_ratio(&self) -> String {
        match self.risk_ratio {
            Some(r) => format!("{}", round_to(r, 4)),
            None => "undefined (zero volatility)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::series::derive;
    use crate::series::tests::series_from_adj;

    #[test]
    fn literal_three_row_scenario() {
        let clean = derive(&series_from_adj(&[100.0, 110.0, 99.0])).clean();
        let ret = aggregate_return(&clean).unwrap();
        assert!(ret.abs() < 1e-9);

        let vol = volatility(&clean).unwrap();
        // population std of (0.10, -0.10) is 0.10
        assert!((vol - 0.10 * 2f64.sqrt()).abs() < 1e-12);

        let ratio = risk_adjusted_return(ret, vol).unwrap();
        assert!(ratio.abs() < 1e-9);
    }

    #[test]
    fn single_spike_sums_to_one_hundred_percent() {
        let clean = derive(&series_from_adj(&[50.0, 50.0, 100.0, 100.0, 100.0])).clean();
        let ret = aggregate_return(&clean).unwrap();
        // changes: 0, 1.0, 0, 0 -> mean 0.25 * 4 * 100
        assert!((ret - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_volatility_has_no_ratio() {
        let err = risk_adjusted_return(1.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateStatistics);

        // two rows -> one change -> std 0
        let clean = derive(&series_from_adj(&[100.0, 101.0])).clean();
        let metrics = ReturnMetrics::compute(&clean).unwrap();
        assert_eq!(metrics.volatility, 0.0);
        assert_eq!(metrics.risk_ratio, None);
        assert_eq!(metrics.display_return(), "1%");
    }

    #[test]
    fn empty_series_is_degenerate() {
        let clean = derive(&series_from_adj(&[100.0])).clean();
        assert_eq!(
            aggregate_return(&clean).unwrap_err().kind(),
            ErrorKind::DegenerateStatistics
        );
        assert_eq!(volatility(&clean).unwrap_err().kind(), ErrorKind::DegenerateStatistics);
    }

    #[test]
    fn display_rounding() {
        let m = ReturnMetrics {
            total_return_pct: 12.34567,
            volatility: 0.123456,
            risk_ratio: Some(1.000049),
        };
        assert_eq!(m.display_return(), "12.35%");
        assert_eq!(m.display_volatility(), "0.1235");
        assert_eq!(m.display_risk_ratio(), "1");
    }
}

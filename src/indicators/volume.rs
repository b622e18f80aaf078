//! Volume-weighted indicators: OBV and Accumulation/Distribution.

use super::IndicatorColumn;

/// On-Balance Volume. The first bar counts as an up day.
pub fn obv(close: &[f64], volume: &[f64]) -> Vec<IndicatorColumn> {
    let mut total = 0.0;
    let values = (0..close.len())
        .map(|i| {
            let sign = match i.checked_sub(1).map(|p| close[i] - close[p]) {
                None => 1.0,
                Some(d) if d > 0.0 => 1.0,
                Some(d) if d < 0.0 => -1.0,
                Some(_) => 0.0,
            };
            total += sign * volume[i];
            Some(total)
        })
        .collect();
    vec![IndicatorColumn::new("OBV", values)]
}

/// Accumulation/Distribution line.
///
/// A bar with `high == low` contributes nothing.
pub fn ad(high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> Vec<IndicatorColumn> {
    let mut total = 0.0;
    let values = (0..close.len())
        .map(|i| {
            let range = high[i] - low[i];
            if range != 0.0 {
                let clv = ((close[i] - low[i]) - (high[i] - close[i])) / range;
                total += clv * volume[i];
            }
            Some(total)
        })
        .collect();
    vec![IndicatorColumn::new("AD", values)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_accumulates_signed_volume() {
        let col = &obv(&[10.0, 11.0, 10.5, 10.5], &[100.0, 200.0, 50.0, 70.0])[0];
        let values: Vec<f64> = col.values.iter().map(|v| v.unwrap()).collect();
        assert_eq!(values, vec![100.0, 300.0, 250.0, 250.0]);
    }

    #[test]
    fn ad_close_at_high_adds_full_volume() {
        let col = &ad(&[10.0, 10.0], &[8.0, 10.0], &[10.0, 10.0], &[500.0, 300.0])[0];
        assert_eq!(col.values, vec![Some(500.0), Some(500.0)]);
    }
}

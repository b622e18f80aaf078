//! Volatility bands and ranges: Bollinger Bands, ATR, Aberration.

use super::IndicatorColumn;
use super::overlap::{rma, rolling_std, sma};

/// Bollinger Bands: lower, mid, upper, bandwidth and %B.
pub fn bbands(close: &[f64], period: usize, width: f64) -> Vec<IndicatorColumn> {
    let mid = sma(close, period);
    let sd = rolling_std(close, period);

    let mut lower = vec![None; close.len()];
    let mut upper = vec![None; close.len()];
    let mut bandwidth = vec![None; close.len()];
    let mut percent = vec![None; close.len()];

    for i in 0..close.len() {
        let (Some(m), Some(s)) = (mid[i], sd[i]) else {
            continue;
        };
        let lo = m - width * s;
        let hi = m + width * s;
        lower[i] = Some(lo);
        upper[i] = Some(hi);
        if m != 0.0 {
            bandwidth[i] = Some(100.0 * (hi - lo) / m);
        }
        if hi != lo {
            percent[i] = Some((close[i] - lo) / (hi - lo));
        }
    }

    let suffix = format!("{period}_{width:.1}");
    vec![
        IndicatorColumn::new(format!("BBL_{suffix}"), lower),
        IndicatorColumn::new(format!("BBM_{suffix}"), mid),
        IndicatorColumn::new(format!("BBU_{suffix}"), upper),
        IndicatorColumn::new(format!("BBB_{suffix}"), bandwidth),
        IndicatorColumn::new(format!("BBP_{suffix}"), percent),
    ]
}

/// True range; the first bar has no previous close and uses `high - low`.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| {
            let hl = high[i] - low[i];
            match i.checked_sub(1).map(|p| close[p]) {
                Some(prev) => hl.max((high[i] - prev).abs()).max((low[i] - prev).abs()),
                None => hl,
            }
        })
        .collect()
}

/// Raw Average True Range values with Wilder smoothing.
pub fn atr_values(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<Option<f64>> {
    rma(&true_range(high, low, close), period)
}

pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<IndicatorColumn> {
    vec![IndicatorColumn::new(
        format!("ATRr_{period}"),
        atr_values(high, low, close, period),
    )]
}

/// Aberration: an SMA of the typical price with ATR-wide bands.
pub fn aberration(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
    atr_period: usize,
) -> Vec<IndicatorColumn> {
    let tp: Vec<f64> = high
        .iter()
        .zip(low)
        .zip(close)
        .map(|((h, l), c)| (h + l + c) / 3.0)
        .collect();
    let zg = sma(&tp, period);
    let range = atr_values(high, low, close, atr_period);

    let sg: Vec<Option<f64>> = zg.iter().zip(&range).map(|(z, a)| Some((*z)? + (*a)?)).collect();
    let xg: Vec<Option<f64>> = zg.iter().zip(&range).map(|(z, a)| Some((*z)? - (*a)?)).collect();

    let suffix = format!("{period}_{atr_period}");
    vec![
        IndicatorColumn::new(format!("ABER_ZG_{suffix}"), zg),
        IndicatorColumn::new(format!("ABER_SG_{suffix}"), sg),
        IndicatorColumn::new(format!("ABER_XG_{suffix}"), xg),
        IndicatorColumn::new(format!("ABER_ATR_{suffix}"), range),
    ]
}

//! Momentum oscillators: RSI, MACD, stochastic, Aroon, ROC, CCI.

use super::IndicatorColumn;
use super::overlap::{ema, ema_opt, rolling, rolling_max, rolling_min, sma, sma_opt};

/// Relative Strength Index with Wilder's smoothing.
///
/// The first value lands at index `period` (it needs `period` price changes).
pub fn rsi(close: &[f64], period: usize) -> Vec<IndicatorColumn> {
    let mut out = vec![None; close.len()];
    if period > 0 && close.len() > period {
        let changes: Vec<f64> = close.windows(2).map(|w| w[1] - w[0]).collect();
        let p = period as f64;

        let mut avg_gain = changes[..period].iter().map(|c| c.max(0.0)).sum::<f64>() / p;
        let mut avg_loss = changes[..period].iter().map(|c| (-c).max(0.0)).sum::<f64>() / p;
        out[period] = Some(rsi_value(avg_gain, avg_loss));

        for (i, c) in changes.iter().enumerate().skip(period) {
            avg_gain = (avg_gain * (p - 1.0) + c.max(0.0)) / p;
            avg_loss = (avg_loss * (p - 1.0) + (-c).max(0.0)) / p;
            out[i + 1] = Some(rsi_value(avg_gain, avg_loss));
        }
    }
    vec![IndicatorColumn::new(format!("RSI_{period}"), out)]
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// MACD line, histogram and signal line.
pub fn macd(close: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<IndicatorColumn> {
    let fast_ema = ema(close, fast);
    let slow_ema = ema(close, slow);
    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let sig = ema_opt(&line, signal);
    let hist: Vec<Option<f64>> = line
        .iter()
        .zip(&sig)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    let suffix = format!("{fast}_{slow}_{signal}");
    vec![
        IndicatorColumn::new(format!("MACD_{suffix}"), line),
        IndicatorColumn::new(format!("MACDh_{suffix}"), hist),
        IndicatorColumn::new(format!("MACDs_{suffix}"), sig),
    ]
}

/// Slow stochastic oscillator: %K smoothed over `smooth_k`, %D over `d`.
pub fn stoch(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k: usize,
    d: usize,
    smooth_k: usize,
) -> Vec<IndicatorColumn> {
    let hh = rolling_max(high, k);
    let ll = rolling_min(low, k);
    let raw: Vec<Option<f64>> = close
        .iter()
        .zip(hh.iter().zip(&ll))
        .map(|(c, (h, l))| {
            let (h, l) = ((*h)?, (*l)?);
            let range = h - l;
            Some(if range == 0.0 { 50.0 } else { 100.0 * (c - l) / range })
        })
        .collect();
    let stoch_k = sma_opt(&raw, smooth_k);
    let stoch_d = sma_opt(&stoch_k, d);

    let suffix = format!("{k}_{d}_{smooth_k}");
    vec![
        IndicatorColumn::new(format!("STOCHk_{suffix}"), stoch_k),
        IndicatorColumn::new(format!("STOCHd_{suffix}"), stoch_d),
    ]
}

/// Aroon down/up/oscillator over a `period + 1` bar lookback.
pub fn aroon(high: &[f64], low: &[f64], period: usize) -> Vec<IndicatorColumn> {
    let p = period as f64;
    let bars_since = |w: &[f64], pick_max: bool| -> f64 {
        // latest occurrence of the extreme wins
        let mut best = 0;
        for (i, v) in w.iter().enumerate() {
            let better = if pick_max { *v >= w[best] } else { *v <= w[best] };
            if better {
                best = i;
            }
        }
        (w.len() - 1 - best) as f64
    };

    let up = rolling(high, period + 1, |w| 100.0 * (p - bars_since(w, true)) / p);
    let down = rolling(low, period + 1, |w| 100.0 * (p - bars_since(w, false)) / p);
    let osc: Vec<Option<f64>> = up.iter().zip(&down).map(|(u, d)| Some((*u)? - (*d)?)).collect();

    vec![
        IndicatorColumn::new(format!("AROOND_{period}"), down),
        IndicatorColumn::new(format!("AROONU_{period}"), up),
        IndicatorColumn::new(format!("AROONOSC_{period}"), osc),
    ]
}

/// Rate of change in percent over `period` bars.
pub fn roc(close: &[f64], period: usize) -> Vec<IndicatorColumn> {
    let out = (0..close.len())
        .map(|i| {
            let prev = *close.get(i.checked_sub(period)?)?;
            (prev != 0.0).then(|| 100.0 * (close[i] / prev - 1.0))
        })
        .collect();
    vec![IndicatorColumn::new(format!("ROC_{period}"), out)]
}

/// Commodity Channel Index on the typical price `(h + l + c) / 3`.
pub fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<IndicatorColumn> {
    const C: f64 = 0.015;
    let tp: Vec<f64> = high
        .iter()
        .zip(low)
        .zip(close)
        .map(|((h, l), c)| (h + l + c) / 3.0)
        .collect();
    let mean_tp = sma(&tp, period);
    let mad = rolling(&tp, period, |w| {
        let m = w.iter().sum::<f64>() / w.len() as f64;
        w.iter().map(|v| (v - m).abs()).sum::<f64>() / w.len() as f64
    });

    let out = tp
        .iter()
        .zip(mean_tp.iter().zip(&mad))
        .map(|(t, (m, d))| {
            let (m, d) = ((*m)?, (*d)?);
            (d != 0.0).then(|| (t - m) / (C * d))
        })
        .collect();
    vec![IndicatorColumn::new(format!("CCI_{period}_{C}"), out)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_of_steady_rise_is_one_hundred() {
        let close: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let col = &rsi(&close, 14)[0];
        assert_eq!(col.name, "RSI_14");
        assert_eq!(col.values[13], None);
        assert_eq!(col.values[14], Some(100.0));
        assert_eq!(col.values[19], Some(100.0));
    }

    #[test]
    fn rsi_balanced_moves_near_fifty() {
        let close = [10.0, 11.0, 10.0, 11.0, 10.0];
        let col = &rsi(&close, 2)[0];
        // gains and losses alternate with equal size
        let v = col.values[2].unwrap();
        assert!((v - 50.0).abs() < 1e-9);
    }

    #[test]
    fn macd_columns_and_warmup() {
        let close: Vec<f64> = (0..40).map(|i| (i as f64 * 0.3).sin() * 5.0 + 100.0).collect();
        let cols = macd(&close, 12, 26, 9);
        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["MACD_12_26_9", "MACDh_12_26_9", "MACDs_12_26_9"]);
        assert_eq!(cols[0].values[24], None);
        assert!(cols[0].values[25].is_some());
        // signal needs 9 MACD values
        assert_eq!(cols[2].values[32], None);
        assert!(cols[2].values[33].is_some());
        assert_eq!(cols[0].values.len(), close.len());
    }

    #[test]
    fn stoch_at_top_of_range_is_one_hundred() {
        let high: Vec<f64> = (0..10).map(|i| i as f64 + 1.0).collect();
        let low: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let close = high.clone();
        let cols = stoch(&high, &low, &close, 3, 2, 2);
        assert_eq!(cols[0].name, "STOCHk_3_2_2");
        let last = cols[0].values.last().copied().flatten().unwrap();
        assert!((last - 100.0).abs() < 1e-9);
        assert!(cols[1].values[4].is_some());
        assert_eq!(cols[1].values[3], None);
    }

    #[test]
    fn aroon_up_is_one_hundred_on_new_high() {
        let high = [1.0, 2.0, 3.0, 4.0, 5.0];
        let low = [5.0, 4.0, 3.0, 2.0, 1.0];
        let cols = aroon(&high, &low, 3);
        assert_eq!(cols[1].values[3], Some(100.0));
        assert_eq!(cols[0].values[3], Some(100.0));
        assert_eq!(cols[2].values[4], Some(0.0));
        assert_eq!(cols[0].values[2], None);
    }

    #[test]
    fn roc_percent() {
        let col = &roc(&[100.0, 110.0, 121.0], 1)[0];
        assert_eq!(col.values[0], None);
        assert!((col.values[2].unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn cci_flat_series_is_undefined() {
        let flat = [5.0; 6];
        let col = &cci(&flat, &flat, &flat, 3)[0];
        assert!(col.values.iter().all(Option::is_none));
    }
}

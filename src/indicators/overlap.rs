//! Moving averages and rolling-window kernels.
//!
//! Every kernel returns a vector aligned to its input: warm-up positions (and
//! positions that depend on a missing input) are `None`.

/// Simple moving average over `period` values.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = Some(sum / period as f64);
    }
    out
}

/// SMA over a partially defined input; a window containing a gap is `None`.
pub fn sma_opt(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling_opt(values, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Exponential moving average, `k = 2 / (period + 1)`, seeded with the SMA
/// of the first `period` values.
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (period as f64 + 1.0);
    seeded_smoothing(values, period, alpha)
}

/// Wilder's moving average (`alpha = 1 / period`), seeded with the SMA.
pub fn rma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let alpha = 1.0 / period as f64;
    seeded_smoothing(values, period, alpha)
}

/// EMA over an input whose leading values may be missing (e.g. MACD's signal line).
pub fn ema_opt(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let Some(first) = values.iter().position(|v| v.is_some()) else {
        return out;
    };
    let tail: Option<Vec<f64>> = values[first..].iter().copied().collect();
    let Some(tail) = tail else {
        return out;
    };
    for (i, v) in ema(&tail, period).into_iter().enumerate() {
        out[first + i] = v;
    }
    out
}

/// Linearly weighted moving average (weights `1..=period`, newest heaviest).
pub fn wma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let denom = (period * (period + 1)) as f64 / 2.0;
    rolling(values, period, |w| {
        w.iter()
            .enumerate()
            .map(|(i, v)| (i + 1) as f64 * v)
            .sum::<f64>()
            / denom
    })
}

/// Population standard deviation over a trailing window.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| {
        let m = w.iter().sum::<f64>() / w.len() as f64;
        (w.iter().map(|v| (v - m).powi(2)).sum::<f64>() / w.len() as f64).sqrt()
    })
}

pub fn rolling_max(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn rolling_min(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Apply `f` to each full trailing window of `period` values.
pub fn rolling(values: &[f64], period: usize, f: impl Fn(&[f64]) -> f64) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        out[i] = Some(f(&values[i + 1 - period..=i]));
    }
    out
}

fn rolling_opt(
    values: &[Option<f64>],
    period: usize,
    f: impl Fn(&[f64]) -> f64,
) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window: Option<Vec<f64>> = values[i + 1 - period..=i].iter().copied().collect();
        out[i] = window.map(|w| f(&w));
    }
    out
}

fn seeded_smoothing(values: &[f64], period: usize, alpha: f64) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let mut prev = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(prev);
    for i in period..values.len() {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        out[i] = Some(prev);
    }
    out
}

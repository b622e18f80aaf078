//! Technical indicator catalog.
//!
//! The catalog is an explicit, name-sorted table of supported indicators.
//! Each entry declares which OHLCV inputs it reads and points at a plain
//! function `(&OhlcvSeries) -> Vec<IndicatorColumn>`. Lookups by name that
//! miss the table are reported as `InvalidIndicatorSelection`.

pub mod momentum;
pub mod overlap;
pub mod volatility;
pub mod volume;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::OhlcvSeries;
use crate::error::AppError;

/// Name of the indicator used when the user has not chosen one.
pub const DEFAULT_INDICATOR: &str = "ema";

/// One output line of an indicator, aligned to the input dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl IndicatorColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An OHLCV field an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl InputField {
    pub fn label(self) -> &'static str {
        match self {
            InputField::Open => "open",
            InputField::High => "high",
            InputField::Low => "low",
            InputField::Close => "close",
            InputField::Volume => "volume",
        }
    }
}

pub type IndicatorFn = fn(&OhlcvSeries) -> Vec<IndicatorColumn>;

/// A catalog entry.
#[derive(Clone, Copy)]
pub struct IndicatorSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub inputs: &'static [InputField],
    pub compute: IndicatorFn,
}

impl std::fmt::Debug for IndicatorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorSpec")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .finish()
    }
}

/// Indicator output with the adjusted close overlaid for comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub indicator: String,
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<IndicatorColumn>,
    /// Adjusted close, labelled `close` in tables and charts.
    pub close: Vec<f64>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Column headers in table order, reference column last.
    pub fn headers(&self) -> Vec<String> {
        let mut out: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        out.push("close".to_string());
        out
    }

    /// Values of row `i` in `headers()` order.
    pub fn row(&self, i: usize) -> Vec<Option<f64>> {
        let mut out: Vec<Option<f64>> = self
            .columns
            .iter()
            .map(|c| c.values.get(i).copied().flatten())
            .collect();
        out.push(self.close.get(i).copied());
        out
    }

    /// Index of the first row where every indicator column is defined.
    pub fn warmup(&self) -> Option<usize> {
        (0..self.len()).find(|&i| self.columns.iter().all(|c| c.values[i].is_some()))
    }
}

use self::InputField::{Close, High, Low, Volume};

const CLOSE: &[InputField] = &[Close];
const HLC: &[InputField] = &[High, Low, Close];
const HL: &[InputField] = &[High, Low];

/// Fixed set of indicators, sorted by name.
#[derive(Debug, Clone)]
pub struct IndicatorCatalog {
    entries: Vec<IndicatorSpec>,
}

impl Default for IndicatorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl IndicatorCatalog {
    pub fn builtin() -> Self {
        let mut entries = vec![
            IndicatorSpec {
                name: "aberration",
                description: "Aberration bands (SMA 5 of typical price +/- ATR 15)",
                inputs: HLC,
                compute: |s| volatility::aberration(&s.high(), &s.low(), &s.close(), 5, 15),
            },
            IndicatorSpec {
                name: "ad",
                description: "Accumulation/Distribution line",
                inputs: &[High, Low, Close, Volume],
                compute: |s| volume::ad(&s.high(), &s.low(), &s.close(), &s.volume()),
            },
            IndicatorSpec {
                name: "aroon",
                description: "Aroon up/down/oscillator (14)",
                inputs: HL,
                compute: |s| momentum::aroon(&s.high(), &s.low(), 14),
            },
            IndicatorSpec {
                name: "atr",
                description: "Average True Range (14, Wilder)",
                inputs: HLC,
                compute: |s| volatility::atr(&s.high(), &s.low(), &s.close(), 14),
            },
            IndicatorSpec {
                name: "bbands",
                description: "Bollinger Bands (5, 2.0)",
                inputs: CLOSE,
                compute: |s| volatility::bbands(&s.close(), 5, 2.0),
            },
            IndicatorSpec {
                name: "cci",
                description: "Commodity Channel Index (14)",
                inputs: HLC,
                compute: |s| momentum::cci(&s.high(), &s.low(), &s.close(), 14),
            },
            IndicatorSpec {
                name: "ema",
                description: "Exponential Moving Average (10)",
                inputs: CLOSE,
                compute: |s| vec![IndicatorColumn::new("EMA_10", overlap::ema(&s.close(), 10))],
            },
            IndicatorSpec {
                name: "macd",
                description: "Moving Average Convergence Divergence (12, 26, 9)",
                inputs: CLOSE,
                compute: |s| momentum::macd(&s.close(), 12, 26, 9),
            },
            IndicatorSpec {
                name: "obv",
                description: "On-Balance Volume",
                inputs: &[Close, Volume],
                compute: |s| volume::obv(&s.close(), &s.volume()),
            },
            IndicatorSpec {
                name: "roc",
                description: "Rate of Change (10)",
                inputs: CLOSE,
                compute: |s| momentum::roc(&s.close(), 10),
            },
            IndicatorSpec {
                name: "rsi",
                description: "Relative Strength Index (14, Wilder)",
                inputs: CLOSE,
                compute: |s| momentum::rsi(&s.close(), 14),
            },
            IndicatorSpec {
                name: "sma",
                description: "Simple Moving Average (10)",
                inputs: CLOSE,
                compute: |s| vec![IndicatorColumn::new("SMA_10", overlap::sma(&s.close(), 10))],
            },
            IndicatorSpec {
                name: "stoch",
                description: "Stochastic oscillator (14, 3, 3)",
                inputs: HLC,
                compute: |s| momentum::stoch(&s.high(), &s.low(), &s.close(), 14, 3, 3),
            },
            IndicatorSpec {
                name: "wma",
                description: "Weighted Moving Average (10)",
                inputs: CLOSE,
                compute: |s| vec![IndicatorColumn::new("WMA_10", overlap::wma(&s.close(), 10))],
            },
        ];
        entries.sort_by_key(|e| e.name);
        Self { entries }
    }

    pub fn entries(&self) -> &[IndicatorSpec] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the default indicator in the catalog.
    pub fn default_index(&self) -> usize {
        self.entries
            .iter()
            .position(|e| e.name == DEFAULT_INDICATOR)
            .unwrap_or(0)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.entries.iter().position(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Result<&IndicatorSpec, AppError> {
        self.index_of(name)
            .map(|i| &self.entries[i])
            .ok_or_else(|| AppError::invalid_indicator(name))
    }

    /// Run the named indicator (or the default when `name` is `None`).
    pub fn compute(
        &self,
        name: Option<&str>,
        series: &OhlcvSeries,
    ) -> Result<IndicatorSeries, AppError> {
        let spec = match name {
            Some(n) => self.get(n)?,
            None => &self.entries[self.default_index()],
        };
        log::debug!("computing indicator {} over {} rows", spec.name, series.len());

        let columns = (spec.compute)(series);
        Ok(IndicatorSeries {
            indicator: spec.name.to_string(),
            dates: series.dates(),
            columns,
            close: series.adj_close(),
        })
    }
}

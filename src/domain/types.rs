//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the data source, the statistics engine and the chart builder
//! - exported to JSON/CSV
//! - rendered by either the CLI or the TUI without conversion

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One daily OHLCV record as delivered by a market data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

/// Daily price history for one ticker.
///
/// Dates are strictly increasing; a source that cannot guarantee this goes
/// through [`OhlcvSeries::new`], which sorts and drops duplicate dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OhlcvSeries {
    pub ticker: String,
    pub rows: Vec<OhlcvRow>,
}

impl OhlcvSeries {
    pub fn new(ticker: impl Into<String>, mut rows: Vec<OhlcvRow>) -> Self {
        rows.sort_by_key(|r| r.date);
        rows.dedup_by_key(|r| r.date);
        Self {
            ticker: ticker.into(),
            rows,
        }
    }

    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn open(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.open).collect()
    }

    pub fn high(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.high).collect()
    }

    pub fn low(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.low).collect()
    }

    pub fn close(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    pub fn adj_close(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.adj_close).collect()
    }

    pub fn volume(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.volume as f64).collect()
    }
}

/// Every numeric column of a derived series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
    Change,
}

impl Column {
    /// Column order used by the describe table and the correlation matrix.
    pub const ALL: [Column; 7] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::AdjClose,
        Column::Volume,
        Column::Change,
    ];

    /// Columns whose maximum and minimum are reported in the extrema table.
    pub const TRACKED: [Column; 6] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::AdjClose,
        Column::Change,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Column::Open => "Open",
            Column::High => "High",
            Column::Low => "Low",
            Column::Close => "Close",
            Column::AdjClose => "Adj Close",
            Column::Volume => "Volume",
            Column::Change => "Change",
        }
    }

    /// Snake-case key used for extrema feature names (`adj_close_max`, ...).
    pub fn key(self) -> &'static str {
        match self {
            Column::Open => "open",
            Column::High => "high",
            Column::Low => "low",
            Column::Close => "close",
            Column::AdjClose => "adj_close",
            Column::Volume => "volume",
            Column::Change => "change",
        }
    }
}

/// The price columns a user can put on the line or scatter chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PriceColumn {
    Open,
    High,
    Low,
    Close,
    AdjClose,
}

impl PriceColumn {
    pub const ALL: [PriceColumn; 5] = [
        PriceColumn::Open,
        PriceColumn::High,
        PriceColumn::Low,
        PriceColumn::Close,
        PriceColumn::AdjClose,
    ];

    pub fn column(self) -> Column {
        match self {
            PriceColumn::Open => Column::Open,
            PriceColumn::High => Column::High,
            PriceColumn::Low => Column::Low,
            PriceColumn::Close => Column::Close,
            PriceColumn::AdjClose => Column::AdjClose,
        }
    }

    pub fn label(self) -> &'static str {
        self.column().label()
    }

    /// Cycle helper for the TUI selectors.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Descriptive company information for the INFO panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerMetadata {
    pub name: Option<String>,
    pub country: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub currency: Option<String>,
    pub timezone: Option<String>,
    pub market_cap: Option<u64>,
    pub website: Option<String>,
}

impl TickerMetadata {
    /// Flat `(label, value)` view in display order; missing fields show as `-`.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        vec![
            ("Name", text(&self.name)),
            ("Country", text(&self.country)),
            ("Sector", text(&self.sector)),
            ("Industry", text(&self.industry)),
            ("Financial Currency", text(&self.currency)),
            ("Time Zone", text(&self.timezone)),
            (
                "Market Cap",
                self.market_cap
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            ("Website", text(&self.website)),
        ]
    }
}

/// A headline returned by the data source, kept in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
}

/// Everything the user can change between render passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// `None` selects the catalog default.
    pub indicator: Option<String>,
    pub line_columns: Vec<PriceColumn>,
    pub scatter_x: PriceColumn,
    pub scatter_y: PriceColumn,
}

impl Selection {
    pub const DEFAULT_LINE_COLUMNS: [PriceColumn; 1] = [PriceColumn::AdjClose];
    pub const DEFAULT_SCATTER_X: PriceColumn = PriceColumn::High;
    pub const DEFAULT_SCATTER_Y: PriceColumn = PriceColumn::Low;

    pub fn new(ticker: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            start,
            end,
            indicator: None,
            line_columns: Self::DEFAULT_LINE_COLUMNS.to_vec(),
            scatter_x: Self::DEFAULT_SCATTER_X,
            scatter_y: Self::DEFAULT_SCATTER_Y,
        }
    }

    /// Trimmed, upper-cased ticker, or `None` when nothing was entered.
    pub fn normalized_ticker(&self) -> Option<String> {
        let t = self.ticker.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_uppercase())
        }
    }
}

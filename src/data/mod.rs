//! Market data sources.
//!
//! The render pass only sees the [`MarketDataSource`] trait. Two
//! implementations ship with the crate:
//!
//! - [`yahoo::YahooClient`]: live daily history, profile and headlines over HTTP
//! - [`sample::SampleSource`]: deterministic synthetic data for offline use

pub mod sample;
pub mod yahoo;

use chrono::NaiveDate;

use crate::domain::{NewsItem, OhlcvSeries, TickerMetadata};
use crate::error::AppError;

/// Read-only access to daily price history and ticker information.
///
/// History covers `start` inclusive to `end` exclusive. An empty series means
/// the source has nothing for the range; `Err` is reserved for transport or
/// decoding failures.
pub trait MarketDataSource {
    fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<OhlcvSeries, AppError>;

    fn fetch_metadata(&self, ticker: &str) -> Result<TickerMetadata, AppError>;

    /// Headlines in source order.
    fn fetch_news(&self, ticker: &str) -> Result<Vec<NewsItem>, AppError>;
}

//! Deterministic synthetic market data for offline runs.
//!
//! Prices follow a geometric random walk over weekdays in `[start, end)`.
//! The RNG is seeded from the ticker, so the same ticker always produces the
//! same path regardless of the requested range length: the walk starts at a
//! fixed anchor date and the range is cut out of it.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::MarketDataSource;
use crate::domain::{NewsItem, OhlcvRow, OhlcvSeries, TickerMetadata};
use crate::error::AppError;

/// Daily log-return volatility of the synthetic walk.
const DAILY_VOL: f64 = 0.015;
/// Small positive drift per day.
const DAILY_DRIFT: f64 = 0.0003;

#[derive(Debug, Clone)]
pub struct SampleSource {
    anchor: NaiveDate,
}

impl Default for SampleSource {
    fn default() -> Self {
        Self {
            anchor: NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl SampleSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarketDataSource for SampleSource {
    fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<OhlcvSeries, AppError> {
        if end <= start || end <= self.anchor {
            return Ok(OhlcvSeries::empty(ticker));
        }

        let mut rng = StdRng::seed_from_u64(ticker_seed(ticker));
        let noise = Normal::new(0.0, 1.0)
            .map_err(|e| AppError::invalid_input(format!("Noise distribution error: {e}")))?;

        let mut price = rng.gen_range(20.0..400.0);
        // Constant dividend-style gap between close and adjusted close.
        let adj_factor = rng.gen_range(0.97..1.0);

        let mut rows = Vec::new();
        let mut date = self.anchor;
        while date < end {
            if is_weekday(date) {
                let open = price;
                let ret = DAILY_DRIFT + DAILY_VOL * noise.sample(&mut rng);
                let close = open * ret.exp();
                let wick_up = DAILY_VOL * noise.sample(&mut rng).abs() * 0.5;
                let wick_down = DAILY_VOL * noise.sample(&mut rng).abs() * 0.5;
                let high = open.max(close) * (1.0 + wick_up);
                let low = open.min(close) * (1.0 - wick_down);
                let volume = (1.0e6 * (1.0 + 0.3 * noise.sample(&mut rng)).abs()) as u64;

                if date >= start {
                    rows.push(OhlcvRow {
                        date,
                        open,
                        high,
                        low,
                        close,
                        adj_close: close * adj_factor,
                        volume,
                    });
                }
                price = close;
            }
            date += Duration::days(1);
        }

        log::info!("{ticker}: {} synthetic rows from {start} to {end}", rows.len());
        Ok(OhlcvSeries::new(ticker, rows))
    }

    fn fetch_metadata(&self, ticker: &str) -> Result<TickerMetadata, AppError> {
        Ok(TickerMetadata {
            name: Some(format!("{ticker} (sample data)")),
            country: Some("Nowhere".to_string()),
            sector: Some("Synthetic".to_string()),
            industry: Some("Random Walks".to_string()),
            currency: Some("USD".to_string()),
            timezone: Some("UTC".to_string()),
            market_cap: None,
            website: None,
        })
    }

    fn fetch_news(&self, _ticker: &str) -> Result<Vec<NewsItem>, AppError> {
        Ok(Vec::new())
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn ticker_seed(ticker: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    ticker.trim().to_uppercase().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekdays_only_and_end_exclusive() {
        let src = SampleSource::new();
        // Mon 2024-01-01 .. Mon 2024-01-15 (exclusive): two full weeks.
        let s = src.fetch_history("AAPL", d(2024, 1, 1), d(2024, 1, 15)).unwrap();
        assert_eq!(s.len(), 10);
        assert!(s.rows.iter().all(|r| is_weekday(r.date)));
        assert_eq!(s.rows.last().unwrap().date, d(2024, 1, 12));
    }

    #[test]
    fn same_ticker_same_path() {
        let src = SampleSource::new();
        let a = src.fetch_history("MSFT", d(2024, 1, 1), d(2024, 3, 1)).unwrap();
        let b = src.fetch_history("msft", d(2024, 2, 1), d(2024, 3, 1)).unwrap();
        let tail = &a.rows[a.len() - b.len()..];
        assert_eq!(tail[0].date, b.rows[0].date);
        assert_eq!(tail[0].close, b.rows[0].close);

        let c = src.fetch_history("GOOG", d(2024, 2, 1), d(2024, 3, 1)).unwrap();
        assert_ne!(c.rows[0].close, b.rows[0].close);
    }

    #[test]
    fn bars_are_consistent() {
        let src = SampleSource::new();
        let s = src.fetch_history("TSLA", d(2023, 1, 1), d(2024, 1, 1)).unwrap();
        for r in &s.rows {
            assert!(r.low <= r.open.min(r.close));
            assert!(r.high >= r.open.max(r.close));
            assert!(r.adj_close > 0.0);
        }
    }

    #[test]
    fn empty_or_inverted_range_is_empty() {
        let src = SampleSource::new();
        assert!(src.fetch_history("AAPL", d(2024, 1, 5), d(2024, 1, 5)).unwrap().is_empty());
        assert!(src.fetch_history("AAPL", d(2024, 1, 6), d(2024, 1, 8)).unwrap().is_empty());
        assert!(src.fetch_news("AAPL").unwrap().is_empty());
    }
}

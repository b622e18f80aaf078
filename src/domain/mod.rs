//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw market data (`OhlcvRow`, `OhlcvSeries`, `TickerMetadata`, `NewsItem`)
//! - column identifiers (`Column`, `PriceColumn`)
//! - the user's current `Selection`

pub mod types;

pub use types::*;

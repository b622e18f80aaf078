//! `stck-viz` library crate.
//!
//! The binary (`stck`) is a thin wrapper around this library so that:
//!
//! - the render pass is testable without spawning processes or a terminal
//! - the data sources, statistics and chart specs are reusable from other front-ends

pub mod app;
pub mod charts;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod series;
pub mod stats;
pub mod tui;

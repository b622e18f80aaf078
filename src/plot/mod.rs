//! Terminal chart rendering for the CLI.

pub mod ascii;

pub use ascii::render_chart;

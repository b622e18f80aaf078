//! Input/output helpers.
//!
//! - series export (CSV) and render-pass export (JSON) (`export`)

pub mod export;

pub use export::*;

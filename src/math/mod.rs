//! Numeric kernels shared by the statistics engine and the indicators.

pub mod moments;

pub use moments::*;

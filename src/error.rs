//! Crate-wide error type.
//!
//! Every fallible operation returns `Result<_, AppError>`. The `kind` lets the
//! render-pass boundary tell expected, user-facing conditions (no ticker, no
//! data, bad indicator name, too little data for statistics) apart from real
//! failures (transport, filesystem, terminal).

use serde::Serialize;

/// What went wrong, coarse-grained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The user has not entered a ticker yet.
    NoTickerSelected,
    /// The data source returned no rows for the ticker/date range.
    NoDataForRange,
    /// The requested indicator is not in the catalog.
    InvalidIndicatorSelection,
    /// Statistics were requested on a series with too few clean rows.
    DegenerateStatistics,
    /// A malformed value supplied on the command line or in the environment.
    InvalidInput,
    /// HTTP request or response decoding failure.
    Transport,
    /// Filesystem or terminal failure.
    Io,
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_ticker() -> Self {
        Self::new(ErrorKind::NoTickerSelected, "Please select a ticker.")
    }

    pub fn no_data(ticker: &str, start: chrono::NaiveDate, end: chrono::NaiveDate) -> Self {
        Self::new(
            ErrorKind::NoDataForRange,
            format!(
                "No data available for {ticker} between {start} and {end}. \
                 Please select a different date range or ticker."
            ),
        )
    }

    pub fn invalid_indicator(name: &str) -> Self {
        Self::new(
            ErrorKind::InvalidIndicatorSelection,
            format!("Unknown technical indicator '{name}'. Run `stck indicators` for the list."),
        )
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DegenerateStatistics, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Expected conditions that end a pass with a message rather than a failure.
    pub fn is_guidance(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::NoTickerSelected
                | ErrorKind::NoDataForRange
                | ErrorKind::InvalidIndicatorSelection
                | ErrorKind::DegenerateStatistics
        )
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind {
            ErrorKind::NoTickerSelected
            | ErrorKind::NoDataForRange
            | ErrorKind::InvalidIndicatorSelection
            | ErrorKind::DegenerateStatistics
            | ErrorKind::InvalidInput => 2,
            ErrorKind::Transport | ErrorKind::Io => 4,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guidance_kinds_map_to_user_exit_code() {
        let err = AppError::no_ticker();
        assert!(err.is_guidance());
        assert_eq!(err.exit_code(), 2);

        let err = AppError::transport("connection reset");
        assert!(!err.is_guidance());
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn no_data_message_names_ticker_and_range() {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let err = AppError::no_data("ZZZZ", start, end);
        assert_eq!(err.kind(), ErrorKind::NoDataForRange);
        assert!(err.to_string().contains("ZZZZ between 2024-01-01 and 2024-02-01"));
    }
}

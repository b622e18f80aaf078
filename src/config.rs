//! Runtime settings from `.env` and the process environment.
//!
//! - `STCK_YAHOO_URL`: base URL of the market data API
//! - `STCK_COOKIE_URL`: page that hands out the session cookie for the crumb
//! - `STCK_USER_AGENT`: HTTP user agent sent with every request
//! - `STCK_NEWS_COUNT`: number of headlines requested per ticker
//! - `STCK_TIMEOUT_SECS`: HTTP timeout
//!
//! Unset variables fall back to defaults; set-but-malformed numbers are an error.

use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
pub const DEFAULT_USER_AGENT: &str = concat!("stck/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_NEWS_COUNT: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub cookie_url: String,
    pub user_agent: String,
    pub news_count: usize,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            news_count: DEFAULT_NEWS_COUNT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        Ok(Self {
            base_url: text("STCK_YAHOO_URL", defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            cookie_url: text("STCK_COOKIE_URL", defaults.cookie_url),
            user_agent: text("STCK_USER_AGENT", defaults.user_agent),
            news_count: parse_var(&lookup, "STCK_NEWS_COUNT", defaults.news_count)?,
            timeout: Duration::from_secs(parse_var(
                &lookup,
                "STCK_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_input(format!("Invalid {key} value '{raw}'."))),
        _ => Ok(default),
    }
}

/// Install the `env_logger` backend. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

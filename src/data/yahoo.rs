//! Yahoo Finance integration: chart, quote summary and search endpoints.
//!
//! The quote summary endpoint wants a session cookie plus a matching `crumb`
//! query parameter. The client keeps cookies, fetches the crumb on first use
//! and refreshes it once when the endpoint answers 401.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::data::MarketDataSource;
use crate::domain::{NewsItem, OhlcvRow, OhlcvSeries, TickerMetadata};
use crate::error::AppError;

const CHART_PATH: &str = "/v8/finance/chart";
const SUMMARY_PATH: &str = "/v10/finance/quoteSummary";
const SEARCH_PATH: &str = "/v1/finance/search";
const CRUMB_PATH: &str = "/v1/test/getcrumb";
const SUMMARY_MODULES: &str = "assetProfile,price,quoteType,financialData";

pub struct YahooClient {
    client: Client,
    base_url: String,
    cookie_url: String,
    news_count: usize,
    crumb: RefCell<Option<String>>,
}

impl YahooClient {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| AppError::transport(format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            cookie_url: settings.cookie_url.clone(),
            news_count: settings.news_count,
            crumb: RefCell::new(None),
        })
    }

    fn send(&self, url: &str, query: &[(&str, String)]) -> Result<Response, AppError> {
        log::info!("GET {url}");
        self.client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| AppError::transport(format!("Request to {url} failed: {e}")))
    }

    /// GET `url` and decode JSON. `Ok(None)` on 404.
    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, AppError> {
        let resp = self.send(url, query)?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(url, status, &resp.text().unwrap_or_default()));
        }

        resp.json()
            .map(Some)
            .map_err(|e| AppError::transport(format!("Failed to parse response from {url}: {e}")))
    }

    /// GET `url` and return the status with the raw body.
    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<(StatusCode, String), AppError> {
        let resp = self.send(url, query)?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| AppError::transport(format!("Failed to read response from {url}: {e}")))?;
        Ok((status, body))
    }

    /// Cached crumb, or a fresh cookie + crumb handshake when `refresh` or unset.
    fn crumb(&self, refresh: bool) -> Result<String, AppError> {
        if !refresh {
            if let Some(crumb) = self.crumb.borrow().clone() {
                return Ok(crumb);
            }
        }

        // Only the Set-Cookie header matters here; the page itself is a 404.
        if let Err(e) = self.send(&self.cookie_url, &[]) {
            log::debug!("session cookie request failed: {e}");
        }

        let url = format!("{}{CRUMB_PATH}", self.base_url);
        let (status, body) = self.get_text(&url, &[])?;
        if !status.is_success() {
            return Err(status_error(&url, status, &body));
        }
        let crumb = parse_crumb(&url, &body)?;
        *self.crumb.borrow_mut() = Some(crumb.clone());
        Ok(crumb)
    }
}

impl MarketDataSource for YahooClient {
    fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<OhlcvSeries, AppError> {
        if end <= start {
            return Ok(OhlcvSeries::empty(ticker));
        }

        let url = format!("{}{CHART_PATH}/{ticker}", self.base_url);
        let query = [
            ("period1", unix_midnight(start).to_string()),
            ("period2", unix_midnight(end).to_string()),
            ("interval", "1d".to_string()),
            ("events", "div|split".to_string()),
        ];
        match self.get_json::<ChartEnvelope>(&url, &query)? {
            Some(body) => parse_chart(ticker, body, start, end),
            None => Ok(OhlcvSeries::empty(ticker)),
        }
    }

    fn fetch_metadata(&self, ticker: &str) -> Result<TickerMetadata, AppError> {
        let url = format!("{}{SUMMARY_PATH}/{ticker}", self.base_url);
        let query = |crumb: String| [("modules", SUMMARY_MODULES.to_string()), ("crumb", crumb)];

        let (mut status, mut body) = self.get_text(&url, &query(self.crumb(false)?))?;
        if status == StatusCode::UNAUTHORIZED {
            log::debug!("{ticker}: crumb rejected, refreshing");
            (status, body) = self.get_text(&url, &query(self.crumb(true)?))?;
        }

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::transport(format!("No profile found for {ticker}.")));
        }
        if !status.is_success() {
            return Err(status_error(&url, status, &body));
        }
        let envelope: SummaryEnvelope = serde_json::from_str(&body)
            .map_err(|e| AppError::transport(format!("Failed to parse response from {url}: {e}")))?;
        parse_summary(ticker, envelope)
    }

    fn fetch_news(&self, ticker: &str) -> Result<Vec<NewsItem>, AppError> {
        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let query = [
            ("q", ticker.to_string()),
            ("newsCount", self.news_count.to_string()),
            ("quotesCount", "0".to_string()),
        ];
        let body: Option<SearchResponse> = self.get_json(&url, &query)?;
        Ok(body
            .map(|b| {
                b.news
                    .into_iter()
                    .map(|n| NewsItem {
                        title: n.title,
                        link: n.link,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Transport error for a non-success status, with the API's own reason when
/// the body carries one.
fn status_error(url: &str, status: StatusCode, body: &str) -> AppError {
    match api_error_detail(body) {
        Some(detail) => AppError::transport(format!(
            "Request to {url} failed with status {status}: {detail}"
        )),
        None => AppError::transport(format!("Request to {url} failed with status {status}.")),
    }
}

/// `code: description` from a `{"<endpoint>": {"error": {...}}}` body.
fn api_error_detail(body: &str) -> Option<String> {
    let envelope: HashMap<String, ErrorBody> = serde_json::from_str(body).ok()?;
    let err = envelope.into_values().find_map(|b| b.error)?;
    match (err.code, err.description) {
        (Some(code), Some(desc)) => Some(format!("{code}: {desc}")),
        (code, desc) => code.or(desc),
    }
}

/// The crumb endpoint answers with the bare token as plain text.
fn parse_crumb(url: &str, body: &str) -> Result<String, AppError> {
    let crumb = body.trim();
    if crumb.is_empty() || crumb.contains(char::is_whitespace) || crumb.starts_with(['{', '<']) {
        return Err(AppError::transport(format!("No crumb in response from {url}.")));
    }
    Ok(crumb.to_string())
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

// `chart` schema

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartResponse,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn parse_chart(
    ticker: &str,
    body: ChartEnvelope,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<OhlcvSeries, AppError> {
    if let Some(err) = body.chart.error {
        let code = err.code.unwrap_or_default();
        if code.eq_ignore_ascii_case("Not Found") {
            return Ok(OhlcvSeries::empty(ticker));
        }
        return Err(AppError::transport(format!(
            "Chart request for {ticker} failed: {} {}",
            code,
            err.description.unwrap_or_default()
        )));
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(OhlcvSeries::empty(ticker));
    };

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    // Without an adjclose block (no corporate actions ever), adjusted equals raw close.
    let adj = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_else(|| quote.close.clone());

    let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();
    let mut rows = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;

    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|d| d.date_naive()) else {
            skipped += 1;
            continue;
        };
        if date < start || date >= end {
            continue;
        }
        let fields = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
            at(&adj, i),
            quote.volume.get(i).copied().flatten(),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(adj_close), Some(volume)) = fields
        else {
            skipped += 1;
            continue;
        };
        rows.push(OhlcvRow {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        });
    }

    if skipped > 0 {
        log::debug!("{ticker}: skipped {skipped} incomplete rows");
    }
    log::info!("{ticker}: {} daily rows from {start} to {end}", rows.len());
    Ok(OhlcvSeries::new(ticker, rows))
}

// `quoteSummary` schema

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryEnvelope {
    quote_summary: SummaryResponse,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    result: Option<Vec<SummaryResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    asset_profile: Option<AssetProfile>,
    price: Option<PriceModule>,
    quote_type: Option<QuoteTypeModule>,
    financial_data: Option<FinancialData>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    country: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    website: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    currency: Option<String>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteTypeModule {
    time_zone_short_name: Option<String>,
    time_zone_full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    financial_currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn parse_summary(ticker: &str, body: SummaryEnvelope) -> Result<TickerMetadata, AppError> {
    if let Some(err) = body.quote_summary.error {
        return Err(AppError::transport(format!(
            "Profile request for {ticker} failed: {}",
            err.description.or(err.code).unwrap_or_default()
        )));
    }
    let r = body
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .unwrap_or_default();

    let (country, sector, industry, website) = match r.asset_profile {
        Some(p) => (p.country, p.sector, p.industry, p.website),
        None => (None, None, None, None),
    };
    let (name, price_currency, market_cap) = match r.price {
        Some(p) => (
            p.long_name.or(p.short_name),
            p.currency,
            p.market_cap
                .and_then(|m| m.raw)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v as u64),
        ),
        None => (None, None, None),
    };

    Ok(TickerMetadata {
        name,
        country,
        sector,
        industry,
        currency: r
            .financial_data
            .and_then(|f| f.financial_currency)
            .or(price_currency),
        timezone: r
            .quote_type
            .and_then(|q| q.time_zone_short_name.or(q.time_zone_full_name)),
        market_cap,
        website,
    })
}

// `search` schema

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
struct SearchNews {
    title: String,
    link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"gmtoffset": -14400},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open":   [187.15, 184.22, null],
                        "high":   [188.44, 185.88, 183.09],
                        "low":    [183.89, 183.43, 180.88],
                        "close":  [185.64, 184.25, 181.91],
                        "volume": [82488700, 58414500, 71983600]
                    }],
                    "adjclose": [{"adjclose": [184.93, 183.55, 181.22]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn chart_rows_skip_nulls_and_use_exchange_dates() {
        let body: ChartEnvelope = serde_json::from_str(CHART).unwrap();
        let series = parse_chart("AAPL", body, d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.rows[0].date, d(2024, 1, 2));
        assert_eq!(series.rows[1].date, d(2024, 1, 3));
        assert_eq!(series.rows[0].adj_close, 184.93);
        assert_eq!(series.rows[1].volume, 58414500);
    }

    #[test]
    fn chart_end_date_is_exclusive() {
        let body: ChartEnvelope = serde_json::from_str(CHART).unwrap();
        let series = parse_chart("AAPL", body, d(2024, 1, 2), d(2024, 1, 3)).unwrap();
        assert_eq!(series.dates(), vec![d(2024, 1, 2)]);
    }

    #[test]
    fn not_found_error_is_empty_not_failure() {
        let raw = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let body: ChartEnvelope = serde_json::from_str(raw).unwrap();
        let series = parse_chart("ZZZZ", body, d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn other_chart_errors_are_transport() {
        let raw = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        let body: ChartEnvelope = serde_json::from_str(raw).unwrap();
        let err = parse_chart("AAPL", body, d(2024, 1, 1), d(2024, 2, 1)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Transport);
    }

    #[test]
    fn summary_maps_profile_fields() {
        let raw = r#"{"quoteSummary":{"result":[{
            "assetProfile":{"country":"United States","sector":"Technology","industry":"Consumer Electronics","website":"https://www.apple.com"},
            "price":{"longName":"Apple Inc.","currency":"USD","marketCap":{"raw":2.9e12,"fmt":"2.9T"}},
            "quoteType":{"timeZoneShortName":"EST","timeZoneFullName":"America/New_York"},
            "financialData":{"financialCurrency":"USD"}
        }],"error":null}}"#;
        let body: SummaryEnvelope = serde_json::from_str(raw).unwrap();
        let meta = parse_summary("AAPL", body).unwrap();
        assert_eq!(meta.name.as_deref(), Some("Apple Inc."));
        assert_eq!(meta.sector.as_deref(), Some("Technology"));
        assert_eq!(meta.timezone.as_deref(), Some("EST"));
        assert_eq!(meta.market_cap, Some(2_900_000_000_000));
    }

    #[test]
    fn unauthorized_body_names_the_cause() {
        let body = r#"{"finance":{"result":null,"error":{"code":"Unauthorized","description":"Invalid Crumb"}}}"#;
        let err = status_error("https://example.com/q", StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.kind(), crate::error::ErrorKind::Transport);
        assert!(err.message().contains("401"));
        assert!(err.message().contains("Unauthorized: Invalid Crumb"));
    }

    #[test]
    fn status_error_without_json_body() {
        let err = status_error("https://example.com/q", StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(err.message().ends_with("502 Bad Gateway."));
    }

    #[test]
    fn crumb_is_trimmed_plain_text() {
        assert_eq!(parse_crumb("u", "aB3.cD/e9\n").unwrap(), "aB3.cD/e9");
        assert!(parse_crumb("u", "").is_err());
        assert!(parse_crumb("u", "<html>Too Many Requests</html>").is_err());
        assert!(parse_crumb("u", r#"{"finance":{"error":{}}}"#).is_err());
    }

    #[test]
    fn empty_range_makes_no_request() {
        // Unroutable base URL: any request would fail with a transport error.
        let settings = Settings {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Settings::default()
        };
        let client = YahooClient::new(&settings).unwrap();
        let series = client.fetch_history("AAPL", d(2024, 1, 5), d(2024, 1, 5)).unwrap();
        assert!(series.is_empty());
    }
}

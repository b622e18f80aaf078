//! The render pass shared by the CLI and TUI front-ends.
//!
//! One call to [`render`] takes the current [`Selection`] and runs the whole
//! workflow top to bottom:
//! history fetch -> derived series -> statistics -> charts -> indicator -> news
//!
//! Nothing is cached between calls. Only a missing ticker, an empty history or
//! a failed history fetch stop the pass; every later failure is confined to
//! its own [`Panel`].

use serde::Serialize;

use crate::charts::{ChartSet, ChartSpec, build_charts, indicator_chart};
use crate::data::MarketDataSource;
use crate::domain::{NewsItem, Selection, TickerMetadata};
use crate::error::{AppError, ErrorKind};
use crate::indicators::{IndicatorCatalog, IndicatorSeries};
use crate::series::{DerivedSeries, derive};
use crate::stats::{self, ColumnSummary, CorrelationMatrix, ResultsPanel, correlate, describe};

/// A view-model section that either computed or explains why it did not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready(T),
    Unavailable { kind: ErrorKind, reason: String },
}

impl<T> Panel<T> {
    fn from_result(result: Result<T, AppError>) -> Self {
        match result {
            Ok(v) => Panel::Ready(v),
            Err(e) => Panel::Unavailable {
                kind: e.kind(),
                reason: e.to_string(),
            },
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(v) => Some(v),
            Panel::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Panel::Ready(_) => None,
            Panel::Unavailable { reason, .. } => Some(reason),
        }
    }

    /// Which failure left the panel empty.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Panel::Ready(_) => None,
            Panel::Unavailable { kind, .. } => Some(*kind),
        }
    }
}

/// Indicator table and its chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPanel {
    pub table: IndicatorSeries,
    pub chart: ChartSpec,
}

/// Everything the view layer shows for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub selection: Selection,
    pub metadata: Panel<TickerMetadata>,
    pub series: DerivedSeries,
    pub summary: Vec<ColumnSummary>,
    pub correlation: CorrelationMatrix,
    pub results: Panel<ResultsPanel>,
    pub charts: ChartSet,
    pub indicator: Panel<IndicatorPanel>,
    pub news: Panel<Vec<NewsItem>>,
}

/// Run one full pass for `selection`.
pub fn render(
    selection: &Selection,
    source: &dyn MarketDataSource,
    catalog: &IndicatorCatalog,
) -> Result<ViewModel, AppError> {
    let ticker = selection.normalized_ticker().ok_or_else(AppError::no_ticker)?;
    log::debug!(
        "render {ticker} {}..{} indicator={:?}",
        selection.start,
        selection.end,
        selection.indicator
    );

    let history = source.fetch_history(&ticker, selection.start, selection.end)?;
    if history.is_empty() {
        return Err(AppError::no_data(&ticker, selection.start, selection.end));
    }

    let metadata = Panel::from_result(source.fetch_metadata(&ticker));

    let series = derive(&history);
    let clean = series.clean();
    let summary = describe(&series);
    let correlation = correlate(&series);

    let results = Panel::from_result(stats::results(&clean));
    if let Some(reason) = results.reason() {
        log::debug!("{ticker}: results panel unavailable: {reason}");
    }
    let charts = build_charts(
        &series,
        &clean,
        results.ready().map(|r| &r.extrema),
        selection,
    );

    let indicator = Panel::from_result(
        catalog
            .compute(selection.indicator.as_deref(), &history)
            .map(|table| IndicatorPanel {
                chart: indicator_chart(&table),
                table,
            }),
    );

    let news = Panel::from_result(source.fetch_news(&ticker));

    Ok(ViewModel {
        selection: Selection {
            ticker,
            ..selection.clone()
        },
        metadata,
        series,
        summary,
        correlation,
        results,
        charts,
        indicator,
        news,
    })
}

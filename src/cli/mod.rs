//! Command-line parsing for the stock dashboard.
//!
//! Argument parsing and command dispatch stay here; the render pass never
//! sees clap types. Both front-ends share [`SelectionArgs`].

use std::path::PathBuf;

use chrono::{Local, Months, NaiveDate};
use clap::{Args, Parser, Subcommand};

use crate::domain::{PriceColumn, Selection};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "stck", version, about = "Stock dashboard: history, statistics, charts and indicators")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one pass for a ticker and print every panel.
    Show(ShowArgs),
    /// List the technical indicator catalog.
    Indicators,
    /// Launch the interactive TUI.
    ///
    /// Every change to the ticker, dates, indicator or chart axes re-runs the
    /// same pass as `stck show`.
    Tui(SelectionArgs),
}

/// What to look at: ticker, date range, indicator and chart axes.
#[derive(Debug, Args, Clone)]
pub struct SelectionArgs {
    /// Ticker symbol (e.g. AAPL).
    #[arg(short = 't', long, default_value = "")]
    pub ticker: String,

    /// First day of the range, inclusive (YYYY-MM-DD). Defaults to one year before `--end`.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Day after the last day of the range, exclusive (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Technical indicator name (see `stck indicators`).
    #[arg(short = 'i', long)]
    pub indicator: Option<String>,

    /// Columns for the line chart.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = Selection::DEFAULT_LINE_COLUMNS)]
    pub columns: Vec<PriceColumn>,

    /// Scatter chart x axis.
    #[arg(long, value_enum, default_value_t = Selection::DEFAULT_SCATTER_X)]
    pub x: PriceColumn,

    /// Scatter chart y axis.
    #[arg(long, value_enum, default_value_t = Selection::DEFAULT_SCATTER_Y)]
    pub y: PriceColumn,

    /// Use the built-in synthetic data source instead of the network.
    #[arg(long)]
    pub offline: bool,
}

impl SelectionArgs {
    pub fn selection(&self) -> Selection {
        self.selection_at(Local::now().date_naive())
    }

    fn selection_at(&self, today: NaiveDate) -> Selection {
        let end = self.end.unwrap_or(today);
        let start = self
            .start
            .unwrap_or_else(|| end.checked_sub_months(Months::new(12)).unwrap_or(end));
        Selection {
            indicator: self.indicator.clone(),
            line_columns: self.columns.clone(),
            scatter_x: self.x,
            scatter_y: self.y,
            ..Selection::new(self.ticker.clone(), start, end)
        }
    }
}

/// Options for `stck show`.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Skip the ASCII charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Rows shown at the head and tail of the data table.
    #[arg(long, default_value_t = 5)]
    pub rows: usize,

    /// Write the whole view model as JSON.
    #[arg(long, value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Write the series with its change column as CSV.
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn show_defaults() {
        let cli = parse(&["stck", "show", "-t", "aapl"]);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let sel = args.selection.selection_at(today);
        assert_eq!(sel.ticker, "aapl");
        assert_eq!(sel.end, today);
        assert_eq!(sel.start, NaiveDate::from_ymd_opt(2023, 6, 30).unwrap());
        assert_eq!(sel.line_columns, vec![PriceColumn::AdjClose]);
        assert_eq!(sel.indicator, None);
        assert!(!args.no_plot);
    }

    #[test]
    fn selection_flags_are_parsed() {
        let cli = parse(&[
            "stck", "show", "-t", "MSFT", "--start", "2024-01-01", "--end", "2024-02-01",
            "--columns", "open,high", "--x", "close", "--y", "adj-close", "-i", "rsi",
        ]);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        let sel = args.selection.selection();
        assert_eq!(sel.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(sel.line_columns, vec![PriceColumn::Open, PriceColumn::High]);
        assert_eq!(sel.scatter_x, PriceColumn::Close);
        assert_eq!(sel.scatter_y, PriceColumn::AdjClose);
        assert_eq!(sel.indicator.as_deref(), Some("rsi"));
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["stck", "show", "--start", "yesterday"]).is_err());
    }
}

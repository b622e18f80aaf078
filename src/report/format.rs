//! Plain-text panels for the `stck show` output.
//!
//! Formatting lives here so:
//! - the statistics and chart code stays free of presentation concerns
//! - output changes are localized

use crate::app::pipeline::{Panel, ViewModel};
use crate::charts::{ChartData, ChartSpec};
use crate::domain::{NewsItem, TickerMetadata};
use crate::indicators::{IndicatorCatalog, IndicatorSeries};
use crate::series::{DerivedRow, DerivedSeries};
use crate::stats::{ColumnSummary, CorrelationMatrix, ResultsPanel};

pub fn format_header(vm: &ViewModel) -> String {
    let name = vm
        .metadata
        .ready()
        .and_then(|m| m.name.as_deref())
        .unwrap_or(&vm.selection.ticker);
    format!(
        "=== stck - {} ({}) | {} to {} ===\n",
        name, vm.selection.ticker, vm.selection.start, vm.selection.end
    )
}

pub fn format_info(metadata: &Panel<TickerMetadata>) -> String {
    let mut out = String::from("INFO\n");
    match metadata {
        Panel::Ready(meta) => {
            for (label, value) in meta.entries() {
                out.push_str(&format!("{label:<20} {value}\n"));
            }
        }
        Panel::Unavailable { reason, .. } => out.push_str(&format!("(unavailable) {reason}\n")),
    }
    out
}

/// Head and tail of the derived table; everything when it is short.
pub fn format_data_table(series: &DerivedSeries, rows: usize) -> String {
    let mut out = format!("Data ({} rows)\n", series.len());
    out.push_str(
        format!(
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>9}\n",
            "Date", "Open", "High", "Low", "Close", "Adj Close", "Volume", "Change"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&rule(&[10, 10, 10, 10, 10, 10, 12, 9]));

    let n = series.len();
    let shown = rows.saturating_mul(2);
    if n <= shown {
        for r in &series.rows {
            out.push_str(&data_row(r));
        }
    } else {
        for r in &series.rows[..rows] {
            out.push_str(&data_row(r));
        }
        out.push_str(&format!("... {} rows omitted ...\n", n - shown));
        for r in &series.rows[n - rows..] {
            out.push_str(&data_row(r));
        }
    }
    out
}

fn data_row(r: &DerivedRow) -> String {
    let change = r
        .change
        .map(|c| format!("{c:.6}"))
        .unwrap_or_else(|| "NaN".to_string());
    let mut line = format!(
        "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12} {:>9}",
        r.date, r.open, r.high, r.low, r.close, r.adj_close, r.volume, change
    );
    line.push('\n');
    line
}

pub fn format_describe(summary: &[ColumnSummary]) -> String {
    let mut out = String::from("Describe\n");
    out.push_str(
        format!(
            "{:<6} {}",
            "",
            summary
                .iter()
                .map(|s| format!("{:>14}", s.column.label()))
                .collect::<Vec<_>>()
                .join(" ")
        )
        .trim_end(),
    );
    out.push('\n');

    let stat_rows: [(&str, fn(&ColumnSummary) -> Option<f64>); 7] = [
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.p25),
        ("50%", |s| s.p50),
        ("75%", |s| s.p75),
        ("max", |s| s.max),
    ];

    out.push_str(&format!(
        "{:<6} {}\n",
        "count",
        summary
            .iter()
            .map(|s| format!("{:>14}", s.count))
            .collect::<Vec<_>>()
            .join(" ")
    ));
    for (label, get) in stat_rows {
        out.push_str(&format!(
            "{:<6} {}\n",
            label,
            summary
                .iter()
                .map(|s| format!("{:>14}", fmt_opt(get(s), 4)))
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }
    out
}

pub fn format_correlation(corr: &CorrelationMatrix) -> String {
    let mut out = String::from("Correlation\n");
    out.push_str(
        format!(
            "{:<10} {}",
            "",
            corr.columns
                .iter()
                .map(|c| format!("{:>10}", c.label()))
                .collect::<Vec<_>>()
                .join(" ")
        )
        .trim_end(),
    );
    out.push('\n');
    for (i, c) in corr.columns.iter().enumerate() {
        out.push_str(&format!(
            "{:<10} {}\n",
            c.label(),
            corr.row(i)
                .iter()
                .map(|v| format!("{:>10}", fmt_opt(*v, 4)))
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }
    out
}

pub fn format_results(results: &Panel<ResultsPanel>) -> String {
    let mut out = String::from("Results\n");
    let panel = match results {
        Panel::Ready(p) => p,
        Panel::Unavailable { reason, .. } => {
            out.push_str(&format!("(unavailable) {reason}\n"));
            return out;
        }
    };

    out.push_str(&format!("{:<16} {:>14} {:<10}\n", "Feature", "Value", "Date"));
    out.push_str(&rule(&[16, 14, 10]));
    for row in &panel.extrema.rows {
        out.push_str(&format!(
            "{:<16} {:>14.6} {:<10}\n",
            row.feature, row.value, row.date
        ));
    }
    out.push('\n');
    out.push_str(&format!("Total Return:        {}\n", panel.metrics.display_return()));
    out.push_str(&format!("Standard Deviation:  {}\n", panel.metrics.display_volatility()));
    out.push_str(&format!("Risk Return:         {}\n", panel.metrics.display_risk_ratio()));
    out
}

/// Box and grouped-bar specs as tables; XY charts go through the ASCII plotter.
pub fn format_chart_table(spec: &ChartSpec) -> String {
    let mut out = format!("{}\n", spec.title);
    match &spec.data {
        ChartData::Boxes(boxes) => {
            out.push_str(&format!(
                "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>9}\n",
                "", "lower", "q1", "median", "q3", "upper", "outliers"
            ));
            for b in boxes {
                out.push_str(&format!(
                    "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>9}\n",
                    b.name,
                    b.lower_whisker,
                    b.q1,
                    b.median,
                    b.q3,
                    b.upper_whisker,
                    b.outliers.len()
                ));
            }
        }
        ChartData::Groups { categories, groups } => {
            out.push_str(
                format!(
                    "{:<10} {}",
                    "",
                    groups
                        .iter()
                        .map(|g| format!("{:>12}", g.name))
                        .collect::<Vec<_>>()
                        .join(" ")
                )
                .trim_end(),
            );
            out.push('\n');
            for (i, cat) in categories.iter().enumerate() {
                out.push_str(&format!(
                    "{:<10} {}\n",
                    cat,
                    groups
                        .iter()
                        .map(|g| format!("{:>12}", fmt_opt(g.values.get(i).copied(), 2)))
                        .collect::<Vec<_>>()
                        .join(" ")
                ));
            }
        }
        ChartData::Series(series) => {
            for s in series {
                out.push_str(&format!("{}: {} points\n", s.name, s.points.len()));
            }
        }
    }
    out
}

pub fn format_indicator_table(table: &IndicatorSeries, rows: usize) -> String {
    let headers = table.headers();
    let mut out = format!("Indicator: {}\n", table.indicator);
    out.push_str(
        format!(
            "{:<10} {}",
            "Date",
            headers
                .iter()
                .map(|h| format!("{:>14}", truncate(h, 14)))
                .collect::<Vec<_>>()
                .join(" ")
        )
        .trim_end(),
    );
    out.push('\n');

    // Tail rows: the warm-up head is mostly empty.
    let start = table.len().saturating_sub(rows);
    for i in start..table.len() {
        out.push_str(&format!(
            "{:<10} {}\n",
            table.dates[i],
            table
                .row(i)
                .iter()
                .map(|v| format!("{:>14}", fmt_opt(*v, 4)))
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }
    out
}

pub fn format_news(news: &Panel<Vec<NewsItem>>) -> String {
    let mut out = String::from("News\n");
    match news {
        Panel::Ready(items) if items.is_empty() => out.push_str("(no headlines)\n"),
        Panel::Ready(items) => {
            for (i, item) in items.iter().enumerate() {
                out.push_str(&format!("#{}. {}\n  {}\n", i + 1, item.title, item.link));
            }
        }
        Panel::Unavailable { reason, .. } => out.push_str(&format!("(unavailable) {reason}\n")),
    }
    out
}

pub fn format_catalog(catalog: &IndicatorCatalog) -> String {
    let default = catalog.default_index();
    let mut out = String::new();
    out.push_str(&format!("  {:<12} {:<20} {}\n", "name", "inputs", "description"));
    out.push_str(&rule(&[13, 20, 11]));
    for (i, spec) in catalog.entries().iter().enumerate() {
        let marker = if i == default { "*" } else { " " };
        let inputs: Vec<&str> = spec.inputs.iter().map(|f| f.label()).collect();
        out.push_str(&format!(
            "{marker} {:<12} {:<20} {}\n",
            spec.name,
            inputs.join(","),
            spec.description
        ));
    }
    out
}

fn rule(widths: &[usize]) -> String {
    let parts: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    format!("{}\n", parts.join(" "))
}

fn fmt_opt(v: Option<f64>, places: usize) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.places$}"),
        _ => "NaN".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::derive;
    use crate::series::tests::series_from_adj;
    use crate::stats::{correlate, results};

    #[test]
    fn data_table_elides_middle_rows() {
        let derived = derive(&series_from_adj(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]));
        let text = format_data_table(&derived, 2);
        assert!(text.contains("... 3 rows omitted ..."));
        assert!(text.contains("2024-03-01"));
        assert!(text.contains("2024-03-07"));
        assert!(!text.contains("2024-03-04"));
        // first change is missing
        let first = text.lines().find(|l| l.starts_with("2024-03-01")).unwrap();
        assert!(first.ends_with("NaN"));
    }

    #[test]
    fn huge_row_count_prints_everything() {
        let derived = derive(&series_from_adj(&[1.0, 2.0, 3.0]));
        let text = format_data_table(&derived, usize::MAX / 2 + 1);
        assert!(!text.contains("omitted"));
        assert!(text.contains("2024-03-03"));
    }

    #[test]
    fn news_headlines_are_numbered() {
        let news = Panel::Ready(vec![
            NewsItem {
                title: "First".to_string(),
                link: "https://example.com/1".to_string(),
            },
            NewsItem {
                title: "Second".to_string(),
                link: "https://example.com/2".to_string(),
            },
        ]);
        let text = format_news(&news);
        assert!(text.contains("#1. First\n  https://example.com/1"));
        assert!(text.contains("#2. Second"));
    }

    #[test]
    fn results_use_display_labels_and_rounding() {
        let clean = derive(&series_from_adj(&[100.0, 110.0, 99.0])).clean();
        let panel = Panel::Ready(results(&clean).unwrap());
        let text = format_results(&panel);
        assert!(text.contains("adj_close_max"));
        assert!(text.contains("Total Return:"));
        assert!(text.contains("0%"));
        assert!(text.contains("Risk Return:"));
    }

    #[test]
    fn unavailable_panels_show_reason() {
        let panel: Panel<ResultsPanel> = Panel::Unavailable {
            kind: crate::error::ErrorKind::DegenerateStatistics,
            reason: "Not enough trading days".to_string(),
        };
        assert!(format_results(&panel).contains("(unavailable) Not enough trading days"));
    }

    #[test]
    fn correlation_prints_unit_diagonal() {
        let derived = derive(&series_from_adj(&[100.0, 104.0, 99.0, 120.0]));
        let text = format_correlation(&correlate(&derived));
        let open_line = text.lines().find(|l| l.starts_with("Open")).unwrap();
        assert!(open_line.contains("1.0000"));
    }

    #[test]
    fn catalog_marks_default() {
        let text = format_catalog(&IndicatorCatalog::builtin());
        let line = text.lines().find(|l| l.contains(" ema ")).unwrap();
        assert!(line.starts_with('*'));
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("ABER_ZG_5_15_long", 8), "ABER_ZG.");
        assert_eq!(truncate("RSI_14", 8), "RSI_14");
    }
}

//! Chart spec builder.
//!
//! Pure functions from series/tables to [`ChartSpec`]s. Nothing here draws.

pub mod spec;

pub use spec::*;

use serde::Serialize;

use crate::domain::{Column, PriceColumn, Selection};
use crate::indicators::IndicatorSeries;
use crate::math::quantile;
use crate::series::{CleanSeries, DerivedSeries};
use crate::stats::{ExtremaTable, ExtremumKind};

/// Line chart of the chosen price columns over time.
///
/// An empty selection falls back to adjusted close alone.
pub fn line_chart(series: &DerivedSeries, columns: &[PriceColumn]) -> ChartSpec {
    let fallback = Selection::DEFAULT_LINE_COLUMNS;
    let columns = if columns.is_empty() {
        &fallback[..]
    } else {
        columns
    };

    let data = columns
        .iter()
        .map(|&c| XySeries {
            name: c.label().to_string(),
            points: series
                .rows
                .iter()
                .filter_map(|r| {
                    Some(Point {
                        x: XValue::Date(r.date),
                        y: r.value(c.column())?,
                        category: None,
                    })
                })
                .collect(),
        })
        .collect();

    ChartSpec {
        title: "Line Chart".to_string(),
        kind: ChartKind::Line,
        x_axis: AxisSpec::new("Date"),
        y_axis: AxisSpec::new("value"),
        data: ChartData::Series(data),
        color_rule: None,
    }
}

/// Bar per trading day of the daily change, colored by sign.
pub fn change_bar_chart(clean: &CleanSeries) -> ChartSpec {
    let points = clean
        .rows()
        .iter()
        .filter_map(|r| {
            let change = r.change?;
            Some(Point {
                x: XValue::Date(r.date),
                y: change,
                category: Some(ChangeCategory::classify(change)),
            })
        })
        .collect();

    ChartSpec {
        title: "Bar Chart for Change".to_string(),
        kind: ChartKind::Bar,
        x_axis: AxisSpec::new("Date"),
        y_axis: AxisSpec::new("Change"),
        data: ChartData::Series(vec![XySeries {
            name: "Change".to_string(),
            points,
        }]),
        color_rule: Some(ColorRule::change_sign()),
    }
}

/// One price column plotted against another.
pub fn scatter_chart(series: &DerivedSeries, x: PriceColumn, y: PriceColumn) -> ChartSpec {
    let points = series
        .rows
        .iter()
        .filter_map(|r| {
            Some(Point {
                x: XValue::Number(r.value(x.column())?),
                y: r.value(y.column())?,
                category: None,
            })
        })
        .collect();

    ChartSpec {
        title: "Comparing".to_string(),
        kind: ChartKind::Scatter,
        x_axis: AxisSpec::new(x.label()),
        y_axis: AxisSpec::new(y.label()),
        data: ChartData::Series(vec![XySeries {
            name: format!("{} vs {}", y.label(), x.label()),
            points,
        }]),
        color_rule: None,
    }
}

/// Side-by-side distributions of open, high, low and close.
pub fn box_chart(series: &DerivedSeries) -> ChartSpec {
    let boxes = [Column::Open, Column::High, Column::Low, Column::Close]
        .iter()
        .filter_map(|&c| {
            let values: Vec<f64> = series.column(c).into_iter().flatten().collect();
            box_summary(c.label(), &values)
        })
        .collect();

    ChartSpec {
        title: "Box Chart".to_string(),
        kind: ChartKind::Box,
        x_axis: AxisSpec::new("variable"),
        y_axis: AxisSpec::new("value"),
        data: ChartData::Boxes(boxes),
        color_rule: None,
    }
}

fn box_summary(name: &str, values: &[f64]) -> Option<BoxSummary> {
    let q1 = quantile(values, 0.25)?;
    let median = quantile(values, 0.5)?;
    let q3 = quantile(values, 0.75)?;
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let inside = values.iter().copied().filter(|v| (lo_fence..=hi_fence).contains(v));
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
    let outliers = values
        .iter()
        .copied()
        .filter(|v| !(lo_fence..=hi_fence).contains(v))
        .collect();

    Some(BoxSummary {
        name: name.to_string(),
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Max and min bars for each price column, from the extrema table.
pub fn extrema_bar_chart(table: &ExtremaTable) -> ChartSpec {
    let columns = PriceColumn::ALL.map(PriceColumn::column);
    let group = |name: &str, kind: ExtremumKind| BarGroup {
        name: name.to_string(),
        values: columns
            .iter()
            .map(|&c| table.value(c, kind).unwrap_or(f64::NAN))
            .collect(),
    };

    ChartSpec {
        title: "Max/Min Values".to_string(),
        kind: ChartKind::GroupedBar,
        x_axis: AxisSpec::new("Feature"),
        y_axis: AxisSpec::new("value"),
        data: ChartData::Groups {
            categories: columns.iter().map(|c| c.label().to_string()).collect(),
            groups: vec![
                group("MaxValue", ExtremumKind::Max),
                group("MinValue", ExtremumKind::Min),
            ],
        },
        color_rule: None,
    }
}

/// Every indicator line plus the close overlay.
pub fn indicator_chart(indicator: &IndicatorSeries) -> ChartSpec {
    let mut data: Vec<XySeries> = indicator
        .columns
        .iter()
        .map(|col| XySeries {
            name: col.name.clone(),
            points: indicator
                .dates
                .iter()
                .zip(&col.values)
                .filter_map(|(d, v)| {
                    Some(Point {
                        x: XValue::Date(*d),
                        y: (*v)?,
                        category: None,
                    })
                })
                .collect(),
        })
        .collect();
    data.push(XySeries {
        name: "close".to_string(),
        points: indicator
            .dates
            .iter()
            .zip(&indicator.close)
            .map(|(d, v)| Point {
                x: XValue::Date(*d),
                y: *v,
                category: None,
            })
            .collect(),
    });

    ChartSpec {
        title: indicator.indicator.to_uppercase(),
        kind: ChartKind::Line,
        x_axis: AxisSpec::new("Date"),
        y_axis: AxisSpec::new("value"),
        data: ChartData::Series(data),
        color_rule: None,
    }
}

/// The Visualization tab's charts for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub line: ChartSpec,
    pub change_bar: ChartSpec,
    pub scatter: ChartSpec,
    pub box_plot: ChartSpec,
    /// Absent when the extrema table could not be computed.
    pub extrema_bar: Option<ChartSpec>,
}

pub fn build_charts(
    series: &DerivedSeries,
    clean: &CleanSeries,
    extrema: Option<&ExtremaTable>,
    selection: &Selection,
) -> ChartSet {
    ChartSet {
        line: line_chart(series, &selection.line_columns),
        change_bar: change_bar_chart(clean),
        scatter: scatter_chart(series, selection.scatter_x, selection.scatter_y),
        box_plot: box_chart(series),
        extrema_bar: extrema.map(extrema_bar_chart),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorCatalog;
    use crate::series::derive;
    use crate::series::tests::series_from_adj;
    use crate::stats::extrema;

    #[test]
    fn line_chart_defaults_to_adj_close() {
        let derived = derive(&series_from_adj(&[100.0, 110.0, 99.0]));
        let chart = line_chart(&derived, &[]);
        let series = chart.xy_series().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "Adj Close");
        assert_eq!(series[0].points.len(), 3);

        let chart = line_chart(&derived, &[PriceColumn::Open, PriceColumn::High]);
        let names: Vec<&str> = chart.xy_series().unwrap().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Open", "High"]);
    }

    #[test]
    fn change_bars_are_colored_by_sign() {
        // changes: +0.10, -0.10, 0.0
        let clean = derive(&series_from_adj(&[100.0, 110.0, 99.0, 99.0])).clean();
        let chart = change_bar_chart(&clean);
        let points = &chart.xy_series().unwrap()[0].points;
        let cats: Vec<ChangeCategory> = points.iter().map(|p| p.category.unwrap()).collect();
        assert_eq!(
            cats,
            vec![
                ChangeCategory::Positive,
                ChangeCategory::Negative,
                ChangeCategory::Negative
            ]
        );
        assert_eq!(chart.kind, ChartKind::Bar);
        assert!(chart.color_rule.is_some());
    }

    #[test]
    fn scatter_binds_selected_axes() {
        let derived = derive(&series_from_adj(&[100.0, 110.0]));
        let chart = scatter_chart(&derived, PriceColumn::High, PriceColumn::Low);
        assert_eq!(chart.x_axis.label, "High");
        assert_eq!(chart.y_axis.label, "Low");
        let p = &chart.xy_series().unwrap()[0].points[0];
        assert_eq!(p.x, XValue::Number(101.0));
        assert_eq!(p.y, 99.0);
    }

    #[test]
    fn box_chart_has_four_boxes() {
        let derived = derive(&series_from_adj(&[1.0, 2.0, 3.0, 4.0, 100.0]));
        let chart = box_chart(&derived);
        let ChartData::Boxes(boxes) = &chart.data else {
            panic!("expected boxes");
        };
        let names: Vec<&str> = boxes.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Open", "High", "Low", "Close"]);
        let open = &boxes[0];
        assert_eq!(open.median, 3.0);
        assert_eq!(open.outliers, vec![100.0]);
        assert_eq!(open.upper_whisker, 4.0);
        assert_eq!(open.lower_whisker, 1.0);
    }

    #[test]
    fn grouped_bars_come_from_extrema() {
        let clean = derive(&series_from_adj(&[100.0, 110.0, 99.0, 105.0])).clean();
        let table = extrema(&clean).unwrap();
        let chart = extrema_bar_chart(&table);
        let ChartData::Groups { categories, groups } = &chart.data else {
            panic!("expected groups");
        };
        assert_eq!(categories.len(), 5);
        assert_eq!(groups[0].name, "MaxValue");
        assert_eq!(groups[1].name, "MinValue");
        assert_eq!(groups[0].values[4], 110.0);
        assert_eq!(groups[1].values[4], 99.0);
    }

    #[test]
    fn indicator_chart_overlays_close() {
        let series = series_from_adj(&(0..15).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let ind = IndicatorCatalog::builtin().compute(Some("sma"), &series).unwrap();
        let chart = indicator_chart(&ind);
        let s = chart.xy_series().unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].points.len(), 6);
        assert_eq!(s[1].name, "close");
        assert_eq!(s[1].points.len(), 15);
    }

    #[test]
    fn grouped_bar_absent_without_extrema() {
        let derived = derive(&series_from_adj(&[100.0]));
        let clean = derived.clean();
        let sel = Selection::new("TEST", derived.rows[0].date, derived.rows[0].date);
        let set = build_charts(&derived, &clean, None, &sel);
        assert!(set.extrema_bar.is_none());
        assert!(set.change_bar.xy_series().unwrap()[0].points.is_empty());
    }
}

//! Plotters-powered chart widget for Ratatui.
//!
//! Any XY [`ChartSpec`] (line, bar, scatter) is first flattened into a
//! [`PreparedChart`]: numeric points, a color per series and padded bounds.
//! Rendering then only draws.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::NaiveDate;
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::charts::{ChangeCategory, ChartKind, ChartSpec, XValue};

/// High-contrast line palette for terminal readability.
const PALETTE: [RGBColor; 5] = [
    RGBColor(0, 255, 255),
    RGBColor(255, 255, 0),
    RGBColor(255, 0, 255),
    RGBColor(0, 255, 0),
    RGBColor(255, 128, 0),
];

#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub name: String,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

/// Render-ready data for one chart.
#[derive(Debug, Clone)]
pub struct PreparedChart {
    pub kind: ChartKind,
    pub series: Vec<PlotSeries>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_is_date: bool,
    pub x_label: String,
    pub y_label: String,
}

impl PreparedChart {
    /// `None` for box and grouped-bar specs, which have no XY data.
    pub fn from_spec(spec: &ChartSpec) -> Option<Self> {
        let xy = spec.xy_series()?;
        let x_is_date = xy
            .iter()
            .flat_map(|s| s.points.first())
            .any(|p| matches!(p.x, XValue::Date(_)));

        let series: Vec<PlotSeries> = if spec.kind == ChartKind::Bar {
            // One series per sign category so each gets the rule's color.
            [ChangeCategory::Negative, ChangeCategory::Positive]
                .into_iter()
                .map(|cat| PlotSeries {
                    name: cat.label().to_string(),
                    color: named_color(cat.color()),
                    points: xy
                        .iter()
                        .flat_map(|s| &s.points)
                        .filter(|p| p.category == Some(cat))
                        .map(|p| (p.x.as_f64(), p.y))
                        .collect(),
                })
                .collect()
        } else {
            spec.numeric_series()
                .into_iter()
                .enumerate()
                .map(|(i, (name, points))| PlotSeries {
                    color: if name == "close" {
                        WHITE
                    } else {
                        PALETTE[i % PALETTE.len()]
                    },
                    name,
                    points,
                })
                .collect()
        };

        let xs = series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
        let ys = series.iter().flat_map(|s| s.points.iter().map(|p| p.1));
        let x_bounds = bounds(xs, false)?;
        let y_bounds = bounds(ys.chain((spec.kind == ChartKind::Bar).then_some(0.0)), true)?;

        Some(Self {
            kind: spec.kind,
            series,
            x_bounds,
            y_bounds,
            x_is_date,
            x_label: spec.x_axis.label.clone(),
            y_label: spec.y_axis.label.clone(),
        })
    }

    pub fn fmt_x(&self, v: f64) -> String {
        if self.x_is_date {
            NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
                .map(|d| d.format("%y-%m-%d").to_string())
                .unwrap_or_default()
        } else {
            format!("{v:.2}")
        }
    }
}

fn named_color(name: &str) -> RGBColor {
    match name {
        "red" => RGBColor(255, 0, 0),
        "green" => RGBColor(0, 255, 0),
        _ => WHITE,
    }
}

/// Finite min/max, optionally padded by 5%. `None` when there is no data.
fn bounds(values: impl Iterator<Item = f64>, pad: bool) -> Option<[f64; 2]> {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }
    if hi <= lo {
        lo -= 1.0;
        hi += 1.0;
    }
    let p = if pad { ((hi - lo) * 0.05).max(1e-12) } else { 0.0 };
    Some([lo - p, hi + p])
}

impl Widget for &PreparedChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label.as_str())
                .y_desc(self.y_label.as_str())
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| self.fmt_x(*v))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(WHITE)
                .bold_line_style(WHITE)
                .draw()?;

            for s in &self.series {
                match self.kind {
                    ChartKind::Line => {
                        chart.draw_series(LineSeries::new(s.points.iter().copied(), s.color))?;
                    }
                    // `Circle` radii are mis-scaled by the backend; a Pixel is a clean dot.
                    ChartKind::Scatter => {
                        chart.draw_series(s.points.iter().map(|&(x, y)| Pixel::new((x, y), s.color)))?;
                    }
                    ChartKind::Bar => {
                        chart.draw_series(
                            s.points
                                .iter()
                                .map(|&(x, y)| PathElement::new(vec![(x, 0.0), (x, y)], s.color)),
                        )?;
                    }
                    ChartKind::Box | ChartKind::GroupedBar => {}
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{box_chart, change_bar_chart, line_chart};
    use crate::series::derive;
    use crate::series::tests::series_from_adj;

    #[test]
    fn bar_chart_splits_by_category_color() {
        let clean = derive(&series_from_adj(&[100.0, 110.0, 99.0, 99.0])).clean();
        let prepared = PreparedChart::from_spec(&change_bar_chart(&clean)).unwrap();
        assert_eq!(prepared.series.len(), 2);
        assert_eq!(prepared.series[0].name, "Negative");
        assert_eq!(prepared.series[0].color, RGBColor(255, 0, 0));
        assert_eq!(prepared.series[0].points.len(), 2);
        assert_eq!(prepared.series[1].points.len(), 1);
        assert!(prepared.y_bounds[0] < 0.0 && prepared.y_bounds[1] > 0.0);
    }

    #[test]
    fn date_axis_formats_as_dates() {
        let derived = derive(&series_from_adj(&[100.0, 101.0]));
        let prepared = PreparedChart::from_spec(&line_chart(&derived, &[])).unwrap();
        assert!(prepared.x_is_date);
        assert_eq!(prepared.fmt_x(prepared.x_bounds[0]), "24-03-01");
    }

    #[test]
    fn box_spec_is_not_plottable() {
        let derived = derive(&series_from_adj(&[100.0, 101.0]));
        assert!(PreparedChart::from_spec(&box_chart(&derived)).is_none());
    }
}

//! Declarative chart descriptions.
//!
//! A `ChartSpec` says *what* to draw (kind, series, axis bindings, color rule);
//! the CLI's ASCII renderer and the TUI's Plotters widget decide *how*.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
    Box,
    GroupedBar,
}

/// An x coordinate: a trading date, or a number (scatter).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XValue {
    Date(NaiveDate),
    Number(f64),
}

impl XValue {
    /// Numeric position for plotting; dates map to their day number.
    pub fn as_f64(&self) -> f64 {
        match self {
            XValue::Date(d) => d.num_days_from_ce() as f64,
            XValue::Number(v) => *v,
        }
    }
}

/// Sign category of a daily change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChangeCategory {
    Negative,
    Positive,
}

impl ChangeCategory {
    /// `change <= 0` is Negative (zero included), `change > 0` is Positive.
    pub fn classify(change: f64) -> Self {
        if change > 0.0 {
            ChangeCategory::Positive
        } else {
            ChangeCategory::Negative
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ChangeCategory::Negative => "red",
            ChangeCategory::Positive => "green",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChangeCategory::Negative => "Negative",
            ChangeCategory::Positive => "Positive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryColor {
    pub category: ChangeCategory,
    pub color: &'static str,
}

/// Threshold coloring: values `<= threshold` take the first category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorRule {
    pub threshold: f64,
    pub categories: Vec<CategoryColor>,
}

impl ColorRule {
    pub fn change_sign() -> Self {
        Self {
            threshold: 0.0,
            categories: [ChangeCategory::Negative, ChangeCategory::Positive]
                .into_iter()
                .map(|category| CategoryColor {
                    category,
                    color: category.color(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: XValue,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ChangeCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XySeries {
    pub name: String,
    pub points: Vec<Point>,
}

/// Five-number summary of one box, whiskers at 1.5 IQR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub name: String,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroup {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartData {
    Series(Vec<XySeries>),
    Boxes(Vec<BoxSummary>),
    Groups {
        categories: Vec<String>,
        groups: Vec<BarGroup>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    pub label: String,
}

impl AxisSpec {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub data: ChartData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_rule: Option<ColorRule>,
}

impl ChartSpec {
    /// The XY series of a line, bar or scatter chart.
    pub fn xy_series(&self) -> Option<&[XySeries]> {
        match &self.data {
            ChartData::Series(s) => Some(s),
            _ => None,
        }
    }

    /// `(x, y)` pairs per series, skipping points without a numeric x.
    pub fn numeric_series(&self) -> Vec<(String, Vec<(f64, f64)>)> {
        self.xy_series()
            .unwrap_or_default()
            .iter()
            .map(|s| {
                let pts = s
                    .points
                    .iter()
                    .map(|p| (p.x.as_f64(), p.y))
                    .collect();
                (s.name.clone(), pts)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_change_is_negative() {
        assert_eq!(ChangeCategory::classify(0.0), ChangeCategory::Negative);
        assert_eq!(ChangeCategory::classify(-0.0), ChangeCategory::Negative);
        assert_eq!(ChangeCategory::classify(-1e-12), ChangeCategory::Negative);
        assert_eq!(ChangeCategory::classify(1e-12), ChangeCategory::Positive);
    }

    #[test]
    fn color_mapping_is_fixed() {
        let rule = ColorRule::change_sign();
        assert_eq!(rule.threshold, 0.0);
        assert_eq!(rule.categories[0].category, ChangeCategory::Negative);
        assert_eq!(rule.categories[0].color, "red");
        assert_eq!(rule.categories[1].category, ChangeCategory::Positive);
        assert_eq!(rule.categories[1].color, "green");
    }

    #[test]
    fn dates_map_to_increasing_numbers() {
        let a = XValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let b = XValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(b.as_f64() - a.as_f64(), 1.0);
    }
}

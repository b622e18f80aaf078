//! ASCII plotting of XY chart specs for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - line series: one glyph per series (`*`, `+`, `x`, `#`, `@`), joined
//! - scatter points: `o`
//! - bars: `+` for positive categories, `-` for negative, drawn from zero

use chrono::NaiveDate;

use crate::charts::{ChangeCategory, ChartKind, ChartSpec, XValue};

const LINE_GLYPHS: [char; 5] = ['*', '+', 'x', '#', '@'];

/// Render a line, bar or scatter spec. Box and grouped-bar specs have no XY
/// data and render as a one-line note.
pub fn render_chart(spec: &ChartSpec, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let series = spec.numeric_series();
    let Some(xy) = spec.xy_series() else {
        return format!("{}: not an XY chart\n", spec.title);
    };
    if series.iter().all(|(_, pts)| pts.is_empty()) {
        return format!("{}: no data\n", spec.title);
    }

    let is_bar = spec.kind == ChartKind::Bar;
    let (x_min, x_max) = range(series.iter().flat_map(|(_, p)| p.iter().map(|q| q.0)));
    let (y_min, y_max) = range(
        series
            .iter()
            .flat_map(|(_, p)| p.iter().map(|q| q.1))
            .chain(is_bar.then_some(0.0)),
    );
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    match spec.kind {
        ChartKind::Line => {
            for (i, (_, pts)) in series.iter().enumerate() {
                let glyph = LINE_GLYPHS[i % LINE_GLYPHS.len()];
                draw_polyline(&mut grid, pts, (x_min, x_max), (y_min, y_max), glyph);
            }
        }
        ChartKind::Scatter => {
            for (_, pts) in &series {
                for &(x, y) in pts {
                    let col = map_x(x, x_min, x_max, width);
                    let row = map_y(y, y_min, y_max, height);
                    grid[row][col] = 'o';
                }
            }
        }
        ChartKind::Bar => {
            let zero = map_y(0.0, y_min, y_max, height);
            for s in xy {
                for p in &s.points {
                    let x = p.x.as_f64();
                    let glyph = match p.category {
                        Some(ChangeCategory::Negative) => '-',
                        _ => '+',
                    };
                    let col = map_x(x, x_min, x_max, width);
                    let row = map_y(p.y, y_min, y_max, height);
                    let (top, bottom) = if row <= zero { (row, zero) } else { (zero, row) };
                    for r in grid.iter_mut().take(bottom + 1).skip(top) {
                        r[col] = glyph;
                    }
                }
            }
        }
        ChartKind::Box | ChartKind::GroupedBar => {}
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}: {}={} | {}=[{y_min:.2}, {y_max:.2}]\n",
        spec.title,
        spec.x_axis.label,
        x_extent(spec, x_min, x_max),
        spec.y_axis.label,
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    if spec.kind == ChartKind::Line && series.len() > 1 {
        let legend: Vec<String> = series
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{} {name}", LINE_GLYPHS[i % LINE_GLYPHS.len()]))
            .collect();
        out.push_str(&format!("  {}\n", legend.join("  ")));
    }

    out
}

/// `[first, last]` as dates for date axes, as numbers otherwise.
fn x_extent(spec: &ChartSpec, x_min: f64, x_max: f64) -> String {
    let dates: Vec<NaiveDate> = spec
        .xy_series()
        .unwrap_or_default()
        .iter()
        .flat_map(|s| &s.points)
        .filter_map(|p| match p.x {
            XValue::Date(d) => Some(d),
            _ => None,
        })
        .collect();
    match (dates.iter().min(), dates.iter().max()) {
        (Some(a), Some(b)) => format!("[{a}, {b}]"),
        _ => format!("[{x_min:.2}, {x_max:.2}]"),
    }
}

/// Finite min/max; a zero-width range is widened to one unit each side.
fn range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    if max > min { (min, max) } else { (min - 1.0, max + 1.0) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(
    grid: &mut [Vec<char>],
    pts: &[(f64, f64)],
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
    glyph: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in pts {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, glyph),
            None => grid[row][col] = glyph,
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Earlier series win on overlap.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{box_chart, change_bar_chart, line_chart, scatter_chart};
    use crate::domain::PriceColumn;
    use crate::series::derive;
    use crate::series::tests::series_from_adj;

    #[test]
    fn flat_line_golden_snapshot() {
        let derived = derive(&series_from_adj(&[100.0, 100.0, 100.0]));
        let txt = render_chart(&line_chart(&derived, &[]), 10, 5);
        let expected = concat!(
            "Line Chart: Date=[2024-03-01, 2024-03-03] | value=[98.90, 101.10]\n",
            "          \n",
            "          \n",
            "**********\n",
            "          \n",
            "          \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn scatter_golden_snapshot() {
        let derived = derive(&series_from_adj(&[100.0, 110.0]));
        let spec = scatter_chart(&derived, PriceColumn::High, PriceColumn::Low);
        let txt = render_chart(&spec, 10, 5);
        let expected = concat!(
            "Comparing: High=[101.00, 111.00] | Low=[98.50, 109.50]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn bars_rise_and_fall_from_zero() {
        let clean = derive(&series_from_adj(&[100.0, 110.0, 99.0])).clean();
        let txt = render_chart(&change_bar_chart(&clean), 10, 9);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        let first_plus = rows.iter().position(|r| r.contains('+')).unwrap();
        let last_minus = rows.iter().rposition(|r| r.contains('-')).unwrap();
        assert!(first_plus < last_minus);
        assert!(rows[0].starts_with('+'));
        assert!(rows[rows.len() - 1].ends_with('-'));
    }

    #[test]
    fn legend_lists_multiple_series() {
        let derived = derive(&series_from_adj(&[100.0, 101.0, 99.0]));
        let spec = line_chart(&derived, &[PriceColumn::High, PriceColumn::Low]);
        let txt = render_chart(&spec, 20, 6);
        assert!(txt.ends_with("  * High  + Low\n"));
    }

    #[test]
    fn non_xy_spec_is_a_note() {
        let derived = derive(&series_from_adj(&[100.0, 101.0]));
        assert_eq!(render_chart(&box_chart(&derived), 20, 6), "Box Chart: not an XY chart\n");
    }
}

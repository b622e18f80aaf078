//! Ratatui-based terminal UI.
//!
//! A sidebar holds the selection (ticker, dates, indicator, chart axes); five
//! tabs show the panels of the last render pass. Every selection change runs
//! a fresh pass. Guidance such as a missing ticker or an empty range shows in
//! the status bar and never leaves the UI.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use crate::app::pipeline::{Panel, ViewModel, render};
use crate::charts::ChartSpec;
use crate::data::MarketDataSource;
use crate::domain::{PriceColumn, Selection};
use crate::error::AppError;
use crate::indicators::IndicatorCatalog;
use crate::report;

mod plotters_chart;

use plotters_chart::PreparedChart;

/// Start the TUI with an initial selection.
pub fn run(selection: Selection, source: Box<dyn MarketDataSource>) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::io(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(selection, source);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::io(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::io(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Info,
    Data,
    Visualization,
    Analysis,
    News,
}

impl Tab {
    const ALL: [Tab; 5] = [Tab::Info, Tab::Data, Tab::Visualization, Tab::Analysis, Tab::News];

    fn title(self) -> &'static str {
        match self {
            Tab::Info => "INFO",
            Tab::Data => "Data",
            Tab::Visualization => "Visualization",
            Tab::Analysis => "Analysis",
            Tab::News => "News",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn step(self, delta: isize) -> Self {
        let n = Self::ALL.len() as isize;
        Self::ALL[(self.index() as isize + delta).rem_euclid(n) as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Ticker,
    Start,
    End,
    Indicator,
    LineColumns,
    ScatterX,
    ScatterY,
}

impl Field {
    const ALL: [Field; 7] = [
        Field::Ticker,
        Field::Start,
        Field::End,
        Field::Indicator,
        Field::LineColumns,
        Field::ScatterX,
        Field::ScatterY,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn is_text(self) -> bool {
        matches!(self, Field::Ticker | Field::Start | Field::End)
    }
}

/// Charts on the Visualization tab, in display order.
const CHART_TITLES: [&str; 5] = ["Line", "Change", "Scatter", "Box", "Max/Min"];

struct App {
    source: Box<dyn MarketDataSource>,
    catalog: IndicatorCatalog,
    selection: Selection,
    indicator_index: usize,
    field: Field,
    tab: Tab,
    chart: usize,
    line_cursor: PriceColumn,
    /// Text being typed into a ticker/date field.
    input: Option<String>,
    scroll: u16,
    status: String,
    view: Option<ViewModel>,
}

impl App {
    fn new(selection: Selection, source: Box<dyn MarketDataSource>) -> Self {
        let catalog = IndicatorCatalog::builtin();
        let indicator_index = selection
            .indicator
            .as_deref()
            .and_then(|name| catalog.index_of(name))
            .unwrap_or_else(|| catalog.default_index());
        let mut app = Self {
            source,
            catalog,
            selection,
            indicator_index,
            field: Field::Ticker,
            tab: Tab::Info,
            chart: 0,
            line_cursor: PriceColumn::Open,
            input: None,
            scroll: 0,
            status: String::new(),
            view: None,
        };
        app.rerender();
        app
    }

    /// One full render pass for the current selection.
    fn rerender(&mut self) {
        match render(&self.selection, self.source.as_ref(), &self.catalog) {
            Ok(vm) => {
                self.status = format!(
                    "{}: {} rows, {} to {}",
                    vm.selection.ticker,
                    vm.series.len(),
                    vm.selection.start,
                    vm.selection.end
                );
                self.view = Some(vm);
            }
            Err(err) => {
                if !err.is_guidance() {
                    log::warn!("render failed: {err}");
                }
                self.status = err.to_string();
                self.view = None;
            }
        }
        self.scroll = 0;
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::io(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::io(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::io(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        if self.input.is_some() {
            self.handle_input(key.code);
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.set_tab(self.tab.step(1)),
            KeyCode::BackTab => self.set_tab(self.tab.step(-1)),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.set_tab(Tab::ALL[idx]);
            }
            KeyCode::Up => {
                let i = self.field.index();
                self.field = Field::ALL[i.saturating_sub(1)];
            }
            KeyCode::Down => {
                let i = self.field.index();
                self.field = Field::ALL[(i + 1).min(Field::ALL.len() - 1)];
            }
            KeyCode::Enter if self.field.is_text() => {
                self.input = Some(self.field_text(self.field));
                self.status = "Editing. Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char(' ') if self.field == Field::LineColumns => {
                let col = self.line_cursor;
                if let Some(pos) = self.selection.line_columns.iter().position(|c| *c == col) {
                    self.selection.line_columns.remove(pos);
                } else {
                    self.selection.line_columns.push(col);
                }
                self.rerender();
            }
            KeyCode::Char(']') => self.chart = (self.chart + 1) % CHART_TITLES.len(),
            KeyCode::Char('[') => self.chart = (self.chart + CHART_TITLES.len() - 1) % CHART_TITLES.len(),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::Char('r') => self.rerender(),
            _ => {}
        }
        false
    }

    fn handle_input(&mut self, code: KeyCode) {
        let Some(buf) = self.input.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.input = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = buf.trim().to_string();
                self.input = None;
                self.apply_text(text);
            }
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Char(c) if !c.is_control() => buf.push(c),
            _ => {}
        }
    }

    fn apply_text(&mut self, text: String) {
        match self.field {
            Field::Ticker => self.selection.ticker = text,
            Field::Start | Field::End => {
                let date = match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
                    Ok(d) => d,
                    Err(e) => {
                        self.status = format!("Invalid date '{text}': {e}");
                        return;
                    }
                };
                if self.field == Field::Start {
                    self.selection.start = date;
                } else {
                    self.selection.end = date;
                }
            }
            _ => return,
        }
        self.rerender();
    }

    fn adjust_field(&mut self, delta: isize) {
        match self.field {
            Field::Indicator => {
                let n = self.catalog.len() as isize;
                if n == 0 {
                    return;
                }
                self.indicator_index = (self.indicator_index as isize + delta).rem_euclid(n) as usize;
                self.selection.indicator = self
                    .catalog
                    .entries()
                    .get(self.indicator_index)
                    .map(|e| e.name.to_string());
            }
            Field::LineColumns => {
                self.line_cursor = step_column(self.line_cursor, delta);
                return;
            }
            Field::ScatterX => self.selection.scatter_x = step_column(self.selection.scatter_x, delta),
            Field::ScatterY => self.selection.scatter_y = step_column(self.selection.scatter_y, delta),
            Field::Ticker | Field::Start | Field::End => return,
        }
        self.rerender();
    }

    fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.scroll = 0;
    }

    fn field_text(&self, field: Field) -> String {
        match field {
            Field::Ticker => self.selection.ticker.clone(),
            Field::Start => self.selection.start.to_string(),
            Field::End => self.selection.end.to_string(),
            Field::Indicator => self
                .selection
                .indicator
                .clone()
                .unwrap_or_else(|| format!("{} (default)", self.catalog.names()[self.indicator_index])),
            Field::LineColumns => {
                let cols: Vec<&str> = self.selection.line_columns.iter().map(|c| c.label()).collect();
                if cols.is_empty() {
                    "(none)".to_string()
                } else {
                    cols.join(", ")
                }
            }
            Field::ScatterX => self.selection.scatter_x.label().to_string(),
            Field::ScatterY => self.selection.scatter_y.label().to_string(),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_tabs(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(chunks[1]);
        self.draw_sidebar(frame, body[0]);
        self.draw_content(frame, body[1]);

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
            .collect();
        let title = match &self.view {
            Some(vm) => format!(" stck - {} ", vm.selection.ticker),
            None => " stck ".to_string(),
        };
        let tabs = Tabs::new(titles)
            .block(Block::default().title(title).borders(Borders::ALL))
            .select(self.tab.index())
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_sidebar(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let label = |f: Field| match f {
            Field::Ticker => "Ticker",
            Field::Start => "Start",
            Field::End => "End",
            Field::Indicator => "Indicator",
            Field::LineColumns => "Line",
            Field::ScatterX => "Scatter X",
            Field::ScatterY => "Scatter Y",
        };

        let mut items: Vec<ListItem> = Field::ALL
            .iter()
            .map(|&f| {
                let value = match &self.input {
                    Some(buf) if f == self.field => format!("{buf}_"),
                    _ => self.field_text(f),
                };
                ListItem::new(format!("{:<10} {value}", label(f)))
            })
            .collect();
        if self.field == Field::LineColumns {
            let on = self.selection.line_columns.contains(&self.line_cursor);
            items.push(ListItem::new(format!(
                "  cursor: [{}] {}",
                if on { "x" } else { " " },
                self.line_cursor.label()
            )));
        }

        let list = List::new(items)
            .block(Block::default().title("Selection").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.field.index()));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_content(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(vm) = &self.view else {
            let msg = Paragraph::new(self.status.as_str())
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true })
                .block(Block::default().title(self.tab.title()).borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        match self.tab {
            Tab::Info => self.draw_text(frame, area, "INFO", report::format_info(&vm.metadata)),
            Tab::Data => {
                let text = [
                    report::format_data_table(&vm.series, 10),
                    report::format_describe(&vm.summary),
                    report::format_correlation(&vm.correlation),
                ]
                .join("\n");
                self.draw_text(frame, area, "Data (PgUp/PgDn scroll)", text);
            }
            Tab::Visualization => self.draw_visualization(frame, area, vm),
            Tab::Analysis => self.draw_analysis(frame, area, vm),
            Tab::News => self.draw_text(frame, area, "News", report::format_news(&vm.news)),
        }
    }

    fn draw_text(&self, frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, text: String) {
        let p = Paragraph::new(text)
            .scroll((self.scroll, 0))
            .block(Block::default().title(title.to_string()).borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_visualization(&self, frame: &mut ratatui::Frame<'_>, area: Rect, vm: &ViewModel) {
        let specs: [Option<&ChartSpec>; 5] = [
            Some(&vm.charts.line),
            Some(&vm.charts.change_bar),
            Some(&vm.charts.scatter),
            Some(&vm.charts.box_plot),
            vm.charts.extrema_bar.as_ref(),
        ];
        let tabs: Vec<String> = CHART_TITLES
            .iter()
            .enumerate()
            .map(|(i, t)| if i == self.chart { format!("[{t}]") } else { t.to_string() })
            .collect();
        let title = format!("{}  ([ ] switch)", tabs.join(" "));

        match specs[self.chart] {
            Some(spec) => self.draw_spec(frame, area, &title, spec),
            None => {
                let reason = vm.results.reason().unwrap_or("Not available.").to_string();
                self.draw_text(frame, area, &title, reason);
            }
        }
    }

    fn draw_analysis(&self, frame: &mut ratatui::Frame<'_>, area: Rect, vm: &ViewModel) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Min(0)])
            .split(area);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(rows[1]);

        self.draw_text(frame, cols[0], "Result", report::format_results(&vm.results));

        match &vm.indicator {
            Panel::Ready(ind) => {
                self.draw_spec(frame, rows[0], &ind.chart.title, &ind.chart);
                self.draw_text(
                    frame,
                    cols[1],
                    "Indicator table",
                    report::format_indicator_table(&ind.table, cols[1].height as usize),
                );
            }
            Panel::Unavailable { reason, .. } => {
                let msg = Paragraph::new(reason.as_str())
                    .style(Style::default().fg(Color::Yellow))
                    .wrap(Wrap { trim: true })
                    .block(Block::default().title("Indicator").borders(Borders::ALL));
                frame.render_widget(msg, rows[0]);
                frame.render_widget(Block::default().borders(Borders::ALL), cols[1]);
            }
        }
    }

    /// Plot XY specs with Plotters; tabulate box and grouped-bar specs.
    fn draw_spec(&self, frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, spec: &ChartSpec) {
        let Some(prepared) = PreparedChart::from_spec(spec) else {
            self.draw_text(frame, area, title, report::format_chart_table(spec));
            return;
        };

        let mut spans = vec![Span::raw(format!("{title} "))];
        for s in &prepared.series {
            let plotters::style::RGBColor(r, g, b) = s.color;
            spans.push(Span::styled(format!("■ {} ", s.name), Style::default().fg(Color::Rgb(r, g, b))));
        }
        let block = Block::default().title(Line::from(spans)).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);
        frame.render_widget(&prepared, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = if self.input.is_some() {
            "type  Enter apply  Esc cancel"
        } else {
            "Tab/1-5 tabs  ↑/↓ field  Enter edit  ←/→ change  Space toggle  [ ] chart  q quit"
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(Text::from(line)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn step_column(col: PriceColumn, delta: isize) -> PriceColumn {
    if delta >= 0 { col.next() } else { col.prev() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::SampleSource;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn app(ticker: &str) -> App {
        let sel = Selection::new(ticker, d(2024, 1, 1), d(2024, 4, 1));
        App::new(sel, Box::new(SampleSource::new()))
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn initial_pass_renders() {
        let app = app("AAPL");
        let vm = app.view.as_ref().unwrap();
        assert_eq!(vm.selection.ticker, "AAPL");
        assert!(app.status.starts_with("AAPL:"));
    }

    #[test]
    fn blank_ticker_shows_guidance() {
        let app = app("");
        assert!(app.view.is_none());
        assert_eq!(app.status, "Please select a ticker.");
    }

    #[test]
    fn editing_ticker_reruns_the_pass() {
        let mut app = app("AAPL");
        press(&mut app, KeyCode::Enter);
        for _ in 0..4 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "msft");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view.as_ref().unwrap().selection.ticker, "MSFT");
    }

    #[test]
    fn invalid_date_keeps_previous_selection() {
        let mut app = app("AAPL");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "x");
        press(&mut app, KeyCode::Enter);
        assert!(app.status.starts_with("Invalid date"));
        assert_eq!(app.selection.start, d(2024, 1, 1));
    }

    #[test]
    fn inverted_range_is_guidance_not_exit() {
        let mut app = app("AAPL");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        for _ in 0..10 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "2023-12-01");
        assert!(!press(&mut app, KeyCode::Enter));
        assert!(app.view.is_none());
        assert!(app.status.contains("No data available for AAPL"));
    }

    #[test]
    fn cycling_indicator_recomputes_panel() {
        let mut app = app("AAPL");
        app.field = Field::Indicator;
        press(&mut app, KeyCode::Right);
        let expected = app.catalog.names()[app.catalog.default_index() + 1];
        let vm = app.view.as_ref().unwrap();
        assert_eq!(vm.indicator.ready().unwrap().table.indicator, expected);
    }

    #[test]
    fn space_toggles_line_columns() {
        let mut app = app("AAPL");
        app.field = Field::LineColumns;
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(
            app.selection.line_columns,
            vec![PriceColumn::AdjClose, PriceColumn::Open]
        );
        let line = &app.view.as_ref().unwrap().charts.line;
        assert_eq!(line.xy_series().unwrap().len(), 2);
    }

    #[test]
    fn tabs_and_quit_keys() {
        let mut app = app("AAPL");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::Data);
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.tab, Tab::News);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.tab, Tab::Visualization);
        assert!(press(&mut app, KeyCode::Char('q')));
    }
}

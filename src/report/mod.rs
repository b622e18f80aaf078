//! Terminal reporting for the `stck show` command.

pub mod format;

pub use format::*;

use crate::app::pipeline::ViewModel;

/// Every text panel of one pass, in dashboard order, without the ASCII charts.
pub fn format_view(vm: &ViewModel, rows: usize) -> Vec<String> {
    let mut panels = vec![
        format_header(vm),
        format_info(&vm.metadata),
        format_data_table(&vm.series, rows),
        format_describe(&vm.summary),
        format_correlation(&vm.correlation),
        format_results(&vm.results),
    ];
    panels.push(format_chart_table(&vm.charts.box_plot));
    if let Some(bar) = &vm.charts.extrema_bar {
        panels.push(format_chart_table(bar));
    }
    match vm.indicator.ready() {
        Some(ind) => panels.push(format_indicator_table(&ind.table, rows)),
        None => panels.push(format!(
            "Indicator\n(unavailable) {}\n",
            vm.indicator.reason().unwrap_or_default()
        )),
    }
    panels.push(format_news(&vm.news));
    panels
}

//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - picks a market data source (Yahoo or the offline sample)
//! - runs the render pass
//! - prints panels and charts, or hands over to the TUI
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, SelectionArgs, ShowArgs};
use crate::config::{Settings, init_logging};
use crate::data::MarketDataSource;
use crate::data::sample::SampleSource;
use crate::data::yahoo::YahooClient;
use crate::error::AppError;
use crate::indicators::IndicatorCatalog;

pub mod pipeline;

/// Entry point for the `stck` binary.
pub fn run() -> Result<(), AppError> {
    // `stck` and `stck -t AAPL` behave like `stck tui ...`. Clap needs a
    // subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Show(args) => {
            init_logging("warn");
            handle_show(args)
        }
        Command::Indicators => {
            init_logging("warn");
            handle_indicators()
        }
        Command::Tui(args) => {
            // Log lines would corrupt the alternate screen.
            init_logging("off");
            handle_tui(args)
        }
    }
}

fn make_source(offline: bool) -> Result<Box<dyn MarketDataSource>, AppError> {
    if offline {
        log::info!("using offline sample data");
        return Ok(Box::new(SampleSource::new()));
    }
    let settings = Settings::from_env()?;
    Ok(Box::new(YahooClient::new(&settings)?))
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let selection = args.selection.selection();
    let source = make_source(args.selection.offline)?;
    let catalog = IndicatorCatalog::builtin();

    let vm = match pipeline::render(&selection, source.as_ref(), &catalog) {
        Ok(vm) => vm,
        // Guidance is a normal outcome of the pass, not a failure.
        Err(err) if err.is_guidance() => {
            println!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    for block in crate::report::format_view(&vm, args.rows) {
        println!("{block}");
    }

    if !args.no_plot {
        let mut specs = vec![&vm.charts.line, &vm.charts.change_bar, &vm.charts.scatter];
        if let Some(ind) = vm.indicator.ready() {
            specs.push(&ind.chart);
        }
        for spec in specs {
            println!("{}", crate::plot::render_chart(spec, args.width, args.height));
        }
    }

    if let Some(path) = &args.export_csv {
        crate::io::write_series_csv(path, &vm.series)?;
        log::info!("wrote {}", path.display());
    }
    if let Some(path) = &args.export_json {
        crate::io::write_view_json(path, &vm)?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}

fn handle_indicators() -> Result<(), AppError> {
    println!("{}", crate::report::format_catalog(&IndicatorCatalog::builtin()));
    Ok(())
}

fn handle_tui(args: SelectionArgs) -> Result<(), AppError> {
    let source = make_source(args.offline)?;
    crate::tui::run(args.selection(), source)
}

/// Rewrite argv so `stck` defaults to `stck tui`.
///
/// Rules:
/// - `stck`                      -> `stck tui`
/// - `stck -t AAPL ...`          -> `stck tui -t AAPL ...`
/// - `stck --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "indicators" | "tui");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_binary_runs_tui() {
        assert_eq!(rewrite_args(args(&["stck"])), args(&["stck", "tui"]));
    }

    #[test]
    fn leading_flag_runs_tui() {
        assert_eq!(
            rewrite_args(args(&["stck", "-t", "AAPL"])),
            args(&["stck", "tui", "-t", "AAPL"])
        );
    }

    #[test]
    fn subcommands_and_help_untouched() {
        for v in [
            &["stck", "show", "-t", "AAPL"][..],
            &["stck", "indicators"][..],
            &["stck", "--help"][..],
            &["stck", "-V"][..],
        ] {
            assert_eq!(rewrite_args(args(v)), args(v));
        }
    }

    #[test]
    fn rewritten_args_parse() {
        let cli = crate::cli::Cli::try_parse_from(rewrite_args(args(&["stck", "--offline"]))).unwrap();
        let Command::Tui(sel) = cli.command else {
            panic!("expected tui");
        };
        assert!(sel.offline);
    }
}

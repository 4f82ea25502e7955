//! mathfix CLI entry point.
//!
//! Fixes the math in a file or content directory, then renders the
//! diagnostics of the run: warnings for expressions left unchanged under
//! the `skip` policy, or the errors that stopped it.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};
use miette::GraphicalReportHandler;

use mathfix_cli::{
    Args,
    error_adapter::{Reportable, to_reportables},
};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logger(&args.log_level);
    debug!(args:?; "Parsed arguments");

    let reporter = GraphicalReportHandler::new();
    match mathfix_cli::run(&args) {
        Ok(report) => {
            for warning in report.warnings() {
                warn!("{}", render(&reporter, &warning));
            }
            info!(
                config = report.config_source().to_string(),
                written = report.written().len(),
                skipped = report.skipped_count();
                "Completed successfully"
            );
        }
        Err(err) => {
            for reportable in to_reportables(&err) {
                error!("{}", render(&reporter, &reportable));
            }
            process::exit(1);
        }
    }
}

/// Log to stderr at `level`, falling back to `warn` for unknown names.
fn init_logger(level: &str) {
    let log_level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
}

fn render(reporter: &GraphicalReportHandler, reportable: &Reportable<'_>) -> String {
    let mut writer = String::new();
    reporter
        .render_report(&mut writer, reportable)
        .expect("Writing to String buffer is infallible");
    writer
}

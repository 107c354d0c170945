pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod query;
pub mod scan;
pub mod summary;

use colored::Colorize;
use std::io::{BufRead, Seek};
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, ColorMode, OutputFormat, cli_parse, cli_parse_from};
pub use config::{QueryConfig, load_config};
pub use error::AppError;
pub use parser::{AccessRecord, Field, FieldValue, LogSource, parse_access_line};
pub use query::{Expression, Query, QueryError, evaluate, parse_query, tokenize};
pub use scan::{QueryReport, ScanOptions, run_query};

use crate::output::{RenderOptions, render_json, render_text};

/// Route diagnostics to stderr; RUST_LOG overrides the verbosity flags
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("access_log_query={default_level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn write_output_file(path: &Path, content: &str) -> Result<(), AppError> {
    std::fs::write(path, content).map_err(|source| AppError::Output {
        path: path.to_path_buf(),
        source,
    })
}

fn report_query_error(report: &QueryReport) {
    if let Some(error) = &report.error {
        eprintln!(
            "{} query '{}': {}",
            "error:".red().bold(),
            report.query,
            error
        );
    }
}

/// Run every query of the batch over one log source, in argument order.
///
/// Reports are handed to `on_report` as soon as each query finishes. A
/// query that fails to parse or stops early leaves the remaining unparsed
/// lines to be reported by a later query.
pub fn run_batch<R: BufRead + Seek>(
    source: &mut LogSource<R>,
    queries: &[String],
    config: &QueryConfig,
    summary: bool,
    mut on_report: impl FnMut(&QueryReport),
) -> std::io::Result<Vec<QueryReport>> {
    let mut reports = Vec::with_capacity(queries.len());
    // unparsed lines are reported once, by whichever query first reads them
    let mut reported_through = 0;

    for text in queries {
        let options = ScanOptions {
            summary,
            report_unparsed: config.parser.report_unparsed,
            reported_through,
        };
        let report = run_query(source, text, config, options)?;
        reported_through = reported_through.max(report.lines_scanned);
        on_report(&report);
        reports.push(report);
    }

    Ok(reports)
}

pub fn run() -> Result<(), AppError> {
    run_cli(cli_parse()?)
}

pub fn run_cli(cli: Cli) -> Result<(), AppError> {
    cli.color.apply();
    init_tracing(cli.log_level());

    let config = load_config(cli.config.as_deref())?;
    tracing::info!(profile = %config.profile_name, "configuration loaded");

    if !cli.log_path.is_file() {
        return Err(AppError::FileNotFound(cli.log_path.clone()));
    }
    let io_error = |source: std::io::Error| AppError::Io {
        path: cli.log_path.clone(),
        source,
    };
    let mut source = LogSource::open(&cli.log_path).map_err(io_error)?;

    let render_options = RenderOptions {
        count_only: cli.count,
    };
    let mut rendered = String::new();

    let reports = run_batch(&mut source, &cli.queries, &config, cli.summary, |report| {
        report_query_error(report);
        if cli.format == OutputFormat::Text {
            let text = render_text(report, render_options);
            print!("{text}");
            rendered.push_str(&text);
        }
    })
    .map_err(io_error)?;

    if cli.format == OutputFormat::Json {
        rendered = render_json(&cli.log_path.to_string_lossy(), &reports)?;
        println!("{rendered}");
    }

    if let Some(path) = &cli.output {
        write_output_file(path, &rendered)?;
    }

    let failed = reports.iter().filter(|r| r.failed()).count();
    if failed > 0 {
        return Err(AppError::QueriesFailed {
            failed,
            total: reports.len(),
        });
    }

    Ok(())
}

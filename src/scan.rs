use serde::{Serialize, Serializer};
use std::io::{self, BufRead, Seek};

use crate::config::QueryConfig;
use crate::parser::LogSource;
use crate::query::{Query, QueryError};
use crate::summary::{Counters, SummaryReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Tally matching records into a frequency summary
    pub summary: bool,
    /// Warn about lines that fail the log grammar
    pub report_unparsed: bool,
    /// Unparsed lines up to this line number were already reported
    pub reported_through: usize,
}

/// Outcome of one query over the whole log
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub query: String,
    /// Matching lines in log order, surrounding whitespace removed
    pub matches: Vec<String>,
    pub match_count: usize,
    pub lines_scanned: usize,
    pub unparsed_lines: usize,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<QueryError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryReport>,
}

impl QueryReport {
    fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            matches: Vec::new(),
            match_count: 0,
            lines_scanned: 0,
            unparsed_lines: 0,
            error: None,
            summary: None,
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

fn serialize_error<S: Serializer>(error: &Option<QueryError>, s: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => s.serialize_str(&e.to_string()),
        None => s.serialize_none(),
    }
}

/// Parse a query and run it over every line of the log.
///
/// Syntax, field and conversion errors stop this query and are returned in
/// the report, together with the matches found before the failure. Only
/// I/O errors on the log itself are returned as `Err`.
pub fn run_query<R: BufRead + Seek>(
    source: &mut LogSource<R>,
    text: &str,
    config: &QueryConfig,
    options: ScanOptions,
) -> io::Result<QueryReport> {
    let mut report = QueryReport::new(text);

    let query = match Query::parse(text) {
        Ok(query) => query,
        Err(e) => {
            tracing::debug!(query = text, error = %e, "query rejected by parser");
            report.error = Some(e);
            return Ok(report);
        }
    };
    tracing::debug!(query = text, expression = %query.expression(), "parsed query");

    let mut counters = options.summary.then(|| Counters::new(&config.summary));

    for line in source.lines(&config.parser)? {
        let line = line?;
        report.lines_scanned += 1;

        let record = match &line.record {
            Ok(record) => record,
            Err(e) => {
                report.unparsed_lines += 1;
                if let Some(counters) = counters.as_mut() {
                    counters.add_unparsed();
                }
                if options.report_unparsed && line.line_number > options.reported_through {
                    tracing::warn!(line = line.line_number, reason = %e, "unparsed line: {}", line.raw);
                }
                continue;
            }
        };

        match query.matches(record) {
            Ok(true) => {
                report.matches.push(line.raw.trim().to_string());
                if let Some(counters) = counters.as_mut() {
                    counters.add(record);
                }
            }
            Ok(false) => {}
            Err(e) => {
                tracing::debug!(line = line.line_number, error = %e, "evaluation failed");
                report.error = Some(e);
                break;
            }
        }
    }

    report.match_count = report.matches.len();
    report.summary = counters.map(|c| c.report(config.summary.top_n));
    tracing::info!(
        query = text,
        matches = report.match_count,
        lines = report.lines_scanned,
        "query finished"
    );

    Ok(report)
}

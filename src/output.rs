use serde::Serialize;
use std::fmt::Write as _;

use crate::scan::QueryReport;
use crate::summary::format_summary_text;

/// Rendering choices shared by every query of a batch
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Print only the number of matches
    pub count_only: bool,
}

/// Text rendering of one query: its matching lines, or their count,
/// followed by the summary tables when one was collected
pub fn render_text(report: &QueryReport, options: RenderOptions) -> String {
    let mut out = String::new();

    if options.count_only {
        let _ = writeln!(out, "{}", report.match_count);
    } else {
        for line in &report.matches {
            let _ = writeln!(out, "{line}");
        }
    }

    if let Some(summary) = &report.summary {
        out.push_str(&format_summary_text(summary));
    }

    out
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    log: &'a str,
    queries: &'a [QueryReport],
}

/// JSON document covering the whole batch
pub fn render_json(log: &str, reports: &[QueryReport]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&BatchOutput {
        log,
        queries: reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(matches: &[&str]) -> QueryReport {
        QueryReport {
            query: "status = 200".to_string(),
            matches: matches.iter().map(|m| m.to_string()).collect(),
            match_count: matches.len(),
            lines_scanned: 10,
            unparsed_lines: 0,
            error: None,
            summary: None,
        }
    }

    #[test]
    fn test_text_lists_lines() {
        let text = render_text(&report(&["a", "b"]), RenderOptions::default());
        assert_eq!(text, "a\nb\n");
    }

    #[test]
    fn test_text_count_only() {
        let options = RenderOptions { count_only: true };
        assert_eq!(render_text(&report(&["a", "b"]), options), "2\n");
        assert_eq!(render_text(&report(&[]), options), "0\n");
    }

    #[test]
    fn test_json_batch() {
        let json = render_json("access.log", &[report(&["a"])]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["log"], "access.log");
        assert_eq!(value["queries"][0]["query"], "status = 200");
        assert_eq!(value["queries"][0]["matches"][0], "a");
        assert!(value["queries"][0].get("error").is_none());
    }
}

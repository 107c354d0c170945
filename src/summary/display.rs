use super::{SummaryReport, ValueCount};
use colored::Colorize;
use comfy_table::{Cell, ContentArrangement, Table};
use std::fmt::Write as _;

/// Longest value shown in a table cell before it is shortened
const MAX_VALUE_WIDTH: usize = 80;

/// Format a frequency summary as text tables
pub fn format_summary_text(report: &SummaryReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "Summary".bold().bright_blue());
    let _ = writeln!(out, "Matching records:  {}", report.records);
    if report.unparsed_lines > 0 {
        let _ = writeln!(
            out,
            "Unparsed lines:    {}",
            report.unparsed_lines.to_string().yellow()
        );
    }
    let _ = writeln!(out, "Android agents:    {}", report.android_agents);
    let _ = writeln!(out, "Googlebot agents:  {}", report.googlebot_agents);

    if report.records == 0 {
        return out;
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Field"),
            Cell::new("Distinct"),
            Cell::new("Value"),
            Cell::new("Count"),
        ]);

    for summary in &report.fields {
        for (i, entry) in summary.top.iter().enumerate() {
            let (name, distinct) = if i == 0 {
                (summary.field.name().to_string(), summary.distinct.to_string())
            } else {
                (String::new(), String::new())
            };
            table.add_row(vec![
                Cell::new(name),
                Cell::new(distinct),
                Cell::new(shorten(&entry.value)),
                Cell::new(entry.count),
            ]);
        }
    }
    let _ = writeln!(out, "{table}");

    if !report.images.is_empty() {
        let _ = writeln!(out, "{}", "Most requested images".bold());
        write_counts(&mut out, &report.images);
    }

    out
}

fn write_counts(out: &mut String, counts: &[ValueCount]) {
    for entry in counts {
        let _ = writeln!(out, "  {:>8}  {}", entry.count, entry.value);
    }
}

fn shorten(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_WIDTH {
        return value.to_string();
    }
    let head: String = value.chars().take(MAX_VALUE_WIDTH - 3).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SummaryRules;
    use crate::summary::Counters;

    #[test]
    fn test_format_contains_counts() {
        let mut counters = Counters::new(&SummaryRules::default());
        let record = crate::parser::AccessRecord {
            ip: "10.0.0.1".parse().unwrap(),
            datetime: chrono::DateTime::parse_from_rfc3339("2015-05-17T10:05:03+00:00").unwrap(),
            method: "GET".to_string(),
            url: "/logo.png".to_string(),
            version: 1.1,
            status: 200,
            size: 10,
            referrer: "-".to_string(),
            user_agent: "curl".to_string(),
        };
        counters.add(&record);
        counters.add(&record);

        let text = format_summary_text(&counters.report(3));
        assert!(text.contains("Matching records:  2"));
        assert!(text.contains("method"));
        assert!(text.contains("/logo.png"));
        assert!(text.contains("Most requested images"));
    }

    #[test]
    fn test_shorten_long_values() {
        let long = "x".repeat(200);
        let short = shorten(&long);
        assert_eq!(short.chars().count(), MAX_VALUE_WIDTH);
        assert!(short.ends_with("..."));
        assert_eq!(shorten("abc"), "abc");
    }
}

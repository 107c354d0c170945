use serde::Serialize;
use std::collections::HashMap;

use crate::config::SummaryRules;
use crate::parser::{AccessRecord, Field};

mod display;

pub use display::format_summary_text;

/// Fields tallied for every matching record
const COUNTED_FIELDS: [Field; 6] = [
    Field::Method,
    Field::Version,
    Field::Status,
    Field::Ip,
    Field::Url,
    Field::UserAgent,
];

/// Frequency counters for the records matched by one query
#[derive(Debug, Clone)]
pub struct Counters {
    image_extensions: Vec<String>,
    records: usize,
    unparsed_lines: usize,
    fields: HashMap<Field, HashMap<String, usize>>,
    images: HashMap<String, usize>,
    android_agents: usize,
    googlebot_agents: usize,
}

impl Counters {
    pub fn new(rules: &SummaryRules) -> Self {
        Self {
            image_extensions: rules
                .image_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            records: 0,
            unparsed_lines: 0,
            fields: HashMap::new(),
            images: HashMap::new(),
            android_agents: 0,
            googlebot_agents: 0,
        }
    }

    pub fn add(&mut self, record: &AccessRecord) {
        self.records += 1;

        for field in COUNTED_FIELDS {
            *self
                .fields
                .entry(field)
                .or_default()
                .entry(record.get(field).to_string())
                .or_insert(0) += 1;
        }

        let url = record.url.to_lowercase();
        if self.image_extensions.iter().any(|ext| url.ends_with(ext)) {
            *self.images.entry(record.url.clone()).or_insert(0) += 1;
        }

        if record.user_agent.contains("Android") {
            self.android_agents += 1;
        }
        if record.user_agent.contains("Googlebot") {
            self.googlebot_agents += 1;
        }
    }

    pub fn add_unparsed(&mut self) {
        self.unparsed_lines += 1;
    }

    /// Build a report keeping the `top_n` most common values of each counter
    pub fn report(&self, top_n: usize) -> SummaryReport {
        let fields = COUNTED_FIELDS
            .iter()
            .map(|field| {
                let counts = self.fields.get(field);
                FieldSummary {
                    field: *field,
                    distinct: counts.map_or(0, HashMap::len),
                    top: counts.map_or_else(Vec::new, |c| most_common(c, top_n)),
                }
            })
            .collect();

        SummaryReport {
            records: self.records,
            unparsed_lines: self.unparsed_lines,
            fields,
            images: most_common(&self.images, top_n),
            android_agents: self.android_agents,
            googlebot_agents: self.googlebot_agents,
        }
    }
}

/// Highest counts first; ties ordered by value so output is stable
fn most_common(counts: &HashMap<String, usize>, n: usize) -> Vec<ValueCount> {
    let mut entries: Vec<(&String, &usize)> = counts.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(n)
        .map(|(value, count)| ValueCount {
            value: value.clone(),
            count: *count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub field: Field,
    pub distinct: usize,
    pub top: Vec<ValueCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub records: usize,
    pub unparsed_lines: usize,
    pub fields: Vec<FieldSummary>,
    pub images: Vec<ValueCount>,
    pub android_agents: usize,
    pub googlebot_agents: usize,
}

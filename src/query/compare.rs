use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

use super::ast::Operator;
use super::error::CoercionError;
use super::glob::Glob;
use crate::parser::FieldValue;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Apply one operator between a query literal and a record value.
///
/// For every operator except `~` the literal is first converted to the
/// value's type; strings compare case-insensitively.
pub fn compare(
    literal: &str,
    operator: Operator,
    value: FieldValue<'_>,
) -> Result<bool, CompareError> {
    if operator == Operator::Glob {
        let glob = Glob::new(literal).map_err(|source| CompareError::Pattern {
            pattern: literal.to_string(),
            source,
        })?;
        return Ok(glob_match(&glob, value));
    }
    Ok(compare_typed(literal, operator, value)?)
}

/// Glob matching runs against the value's string form, without case folding
pub fn glob_match(glob: &Glob, value: FieldValue<'_>) -> bool {
    glob.is_match(&value.to_string())
}

/// Compare after coercing the literal through the table for the value's kind
pub fn compare_typed(
    literal: &str,
    operator: Operator,
    value: FieldValue<'_>,
) -> Result<bool, CoercionError> {
    let mismatch = || CoercionError {
        literal: literal.to_string(),
        expected: value.kind(),
    };
    let ordering = match value {
        FieldValue::Integer(actual) => {
            let other: i64 = coerce(literal).ok_or_else(mismatch)?;
            actual.partial_cmp(&other)
        }
        FieldValue::Float(actual) => {
            let other: f64 = coerce(literal).ok_or_else(mismatch)?;
            actual.partial_cmp(&other)
        }
        FieldValue::Ip(actual) => {
            let other: Ipv4Addr = coerce(literal).ok_or_else(mismatch)?;
            actual.partial_cmp(&other)
        }
        FieldValue::Timestamp(actual) => {
            let other = coerce_timestamp(literal).ok_or_else(mismatch)?;
            actual.partial_cmp(&other)
        }
        FieldValue::Text(actual) => actual.to_lowercase().partial_cmp(&literal.to_lowercase()),
    };
    Ok(apply(operator, ordering))
}

/// `ordering` is the record value relative to the literal; `None` means
/// unordered (NaN) and satisfies nothing.
fn apply(operator: Operator, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match operator {
        Operator::Eq => ordering == Ordering::Equal,
        Operator::Gt => ordering == Ordering::Greater,
        Operator::Ge => ordering != Ordering::Less,
        Operator::Lt => ordering == Ordering::Less,
        Operator::Le => ordering != Ordering::Greater,
        Operator::Glob => false,
    }
}

/// Integers, floats and IPv4 addresses ignore surrounding whitespace
fn coerce<T: FromStr>(literal: &str) -> Option<T> {
    literal.trim().parse().ok()
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// ISO-8601 date or date-time; without an offset the literal is read as UTC
fn coerce_timestamp(literal: &str) -> Option<DateTime<FixedOffset>> {
    let text = literal.trim();
    let utc = FixedOffset::east_opt(0)?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts);
    }
    // chrono's %#z does not accept a bare "Z"
    let text_z = text.strip_suffix('Z').or_else(|| text.strip_suffix('z'));
    if let Some(naive_text) = text_z {
        if let Some(naive) = parse_naive(naive_text) {
            return Some(naive.and_utc().with_timezone(&utc));
        }
    }
    if let Some(ts) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    {
        return Some(ts);
    }
    parse_naive(text).map(|naive| naive.and_utc().with_timezone(&utc))
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

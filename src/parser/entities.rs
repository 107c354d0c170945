use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Fields every access-log record exposes to queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Ip,
    Datetime,
    Method,
    Url,
    Version,
    Status,
    Size,
    Referrer,
    UserAgent,
}

/// Value type carried by a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Ip,
    Timestamp,
    Text,
    Float,
    Integer,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Ip,
        Field::Datetime,
        Field::Method,
        Field::Url,
        Field::Version,
        Field::Status,
        Field::Size,
        Field::Referrer,
        Field::UserAgent,
    ];

    /// Get the query-facing name of this field
    pub fn name(&self) -> &'static str {
        match self {
            Field::Ip => "ip",
            Field::Datetime => "datetime",
            Field::Method => "method",
            Field::Url => "url",
            Field::Version => "version",
            Field::Status => "status",
            Field::Size => "size",
            Field::Referrer => "referrer",
            Field::UserAgent => "user_agent",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Ip => FieldKind::Ip,
            Field::Datetime => FieldKind::Timestamp,
            Field::Method | Field::Url | Field::Referrer | Field::UserAgent => FieldKind::Text,
            Field::Version => FieldKind::Float,
            Field::Status | Field::Size => FieldKind::Integer,
        }
    }
}

impl FromStr for Field {
    type Err = String;

    /// Field names are matched case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.name() == lower)
            .ok_or(lower)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Ip => write!(f, "an IPv4 address"),
            FieldKind::Timestamp => write!(f, "an ISO-8601 timestamp"),
            FieldKind::Text => write!(f, "a string"),
            FieldKind::Float => write!(f, "a floating point number"),
            FieldKind::Integer => write!(f, "an integer"),
        }
    }
}

/// A typed field value borrowed from a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Ip(Ipv4Addr),
    Timestamp(DateTime<FixedOffset>),
    Text(&'a str),
    Float(f64),
    Integer(i64),
}

impl FieldValue<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Ip(_) => FieldKind::Ip,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Integer(_) => FieldKind::Integer,
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    /// String form used as the subject of glob matching
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Ip(ip) => write!(f, "{ip}"),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%:z")),
            FieldValue::Text(text) => f.write_str(text),
            // Whole floats keep their trailing ".0" ("1.0", not "1")
            FieldValue::Float(value) => write!(f, "{value:?}"),
            FieldValue::Integer(value) => write!(f, "{value}"),
        }
    }
}

/// One parsed line of a combined-format access log
#[derive(Debug, Clone, PartialEq)]
pub struct AccessRecord {
    pub ip: Ipv4Addr,
    pub datetime: DateTime<FixedOffset>,
    pub method: String,
    pub url: String,
    /// HTTP protocol version, e.g. 1.1
    pub version: f64,
    pub status: i64,
    /// Response size in bytes; a "-" column maps to the configured default
    pub size: i64,
    pub referrer: String,
    pub user_agent: String,
}

impl AccessRecord {
    pub fn get(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Ip => FieldValue::Ip(self.ip),
            Field::Datetime => FieldValue::Timestamp(self.datetime),
            Field::Method => FieldValue::Text(&self.method),
            Field::Url => FieldValue::Text(&self.url),
            Field::Version => FieldValue::Float(self.version),
            Field::Status => FieldValue::Integer(self.status),
            Field::Size => FieldValue::Integer(self.size),
            Field::Referrer => FieldValue::Text(&self.referrer),
            Field::UserAgent => FieldValue::Text(&self.user_agent),
        }
    }

    /// Look a field up by its query name
    pub fn lookup(&self, name: &str) -> Option<FieldValue<'_>> {
        name.parse::<Field>().ok().map(|field| self.get(field))
    }
}

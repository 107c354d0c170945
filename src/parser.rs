use chrono::DateTime;
use regex::{Captures, Regex};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

use crate::config::ParserRules;

mod entities;

pub use entities::{AccessRecord, Field, FieldKind, FieldValue};

static ACCESS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?xs)
        ^(?P<ip>(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?))
        (?:\s+-){2}\s+
        \[(?P<datetime>\d{2}/\w+/\d{4}(?::\d{2}){3}\s+\+\d{4})\]\s+"
        (?P<method>\w+)\s+
        (?P<url>\S+)\s+
        HTTP/(?P<version>\d\.\d)"\s+
        (?P<status>\d+)\s+
        (?P<size>\d+|-)\s+"
        (?P<referrer>[^"]+)"\s+"
        (?P<user_agent>[^"]+)"?\s*
        "#,
    )
    .expect("valid access log regex")
});

/// Errors raised while extracting a record from a log line
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line does not match the access log format")]
    InvalidLogFormat,

    #[error("invalid {field} value '{value}'")]
    InvalidField { field: Field, value: String },

    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

/// Parses a single access-log line into an AccessRecord
pub fn parse_access_line(line: &str, rules: &ParserRules) -> Result<AccessRecord, ParseError> {
    let caps = ACCESS_LINE_RE
        .captures(line)
        .ok_or(ParseError::InvalidLogFormat)?;

    let datetime_text = &caps["datetime"];
    let datetime = DateTime::parse_from_str(datetime_text, &rules.timestamp_format)
        .map_err(|_| invalid(Field::Datetime, datetime_text))?;

    let size = match &caps["size"] {
        "-" => rules.missing_size,
        raw => parse_capture(raw, Field::Size)?,
    };

    Ok(AccessRecord {
        ip: parse_capture(&caps["ip"], Field::Ip)?,
        datetime,
        method: capture(&caps, "method"),
        url: capture(&caps, "url"),
        version: parse_capture(&caps["version"], Field::Version)?,
        status: parse_capture(&caps["status"], Field::Status)?,
        size,
        referrer: capture(&caps, "referrer"),
        user_agent: capture(&caps, "user_agent"),
    })
}

fn capture(caps: &Captures<'_>, name: &str) -> String {
    caps[name].to_string()
}

fn parse_capture<T: std::str::FromStr>(raw: &str, field: Field) -> Result<T, ParseError> {
    raw.parse().map_err(|_| invalid(field, raw))
}

fn invalid(field: Field, value: &str) -> ParseError {
    ParseError::InvalidField {
        field,
        value: value.to_string(),
    }
}

/// One line of the log, with its record when the line matched the grammar
#[derive(Debug)]
pub struct LogLine {
    /// 1-based position in the file
    pub line_number: usize,
    pub raw: String,
    pub record: Result<AccessRecord, ParseError>,
}

/// A rewindable access-log stream shared by every query of a batch
pub struct LogSource<R> {
    reader: R,
}

impl LogSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead + Seek> LogSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Restart from the first line and iterate over parsed lines
    pub fn lines<'a>(&'a mut self, rules: &'a ParserRules) -> io::Result<LogLines<'a, R>> {
        self.reader.rewind()?;
        Ok(LogLines {
            reader: &mut self.reader,
            rules,
            line_number: 0,
        })
    }
}

pub struct LogLines<'a, R> {
    reader: &'a mut R,
    rules: &'a ParserRules,
    line_number: usize,
}

impl<R: BufRead> Iterator for LogLines<'_, R> {
    type Item = Result<LogLine, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                // undecodable lines are kept, lossily, as unparsed lines
                let (raw, record) = match String::from_utf8(buf) {
                    Ok(raw) => {
                        let record = parse_access_line(&raw, self.rules);
                        (raw, record)
                    }
                    Err(e) => (
                        String::from_utf8_lossy(e.as_bytes()).into_owned(),
                        Err(ParseError::InvalidEncoding),
                    ),
                };
                Some(Ok(LogLine {
                    line_number: self.line_number,
                    raw,
                    record,
                }))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

use access_log_query::config::ParserRules;
use access_log_query::parser::{Field, FieldValue, LogSource, ParseError, parse_access_line};
use std::io::Cursor;
use std::net::Ipv4Addr;

const GOOGLEBOT_LINE: &str = r#"66.249.73.135 - - [17/May/2015:10:05:40 +0000] "GET /blog/tags/ipv6 HTTP/1.1" 200 12251 "-" "Mozilla/5.0 (iPhone; CPU iPhone OS 6_0 like Mac OS X) AppleWebKit/536.26 (KHTML, like Gecko) Version/6.0 Mobile/10A5376e Safari/8536.25 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)""#;

#[test]
fn test_parse_googlebot_line() {
    let record = parse_access_line(GOOGLEBOT_LINE, &ParserRules::default())
        .expect("line should match the access log grammar");

    assert_eq!(record.ip, Ipv4Addr::new(66, 249, 73, 135));
    assert_eq!(record.method, "GET");
    assert_eq!(record.url, "/blog/tags/ipv6");
    assert_eq!(record.status, 200);
    assert_eq!(record.size, 12251);
    assert_eq!(record.referrer, "-");
    assert!(record.user_agent.contains("Version/6.0 Mobile"));
    assert_eq!(record.datetime.to_rfc3339(), "2015-05-17T10:05:40+00:00");
}

#[test]
fn test_typed_lookup() {
    let record = parse_access_line(GOOGLEBOT_LINE, &ParserRules::default()).expect("parses");

    assert_eq!(record.get(Field::Status), FieldValue::Integer(200));
    assert_eq!(record.get(Field::Version), FieldValue::Float(1.1));
    assert_eq!(record.get(Field::Method), FieldValue::Text("GET"));
    assert_eq!(
        record.lookup("USER_AGENT").map(|v| v.kind()),
        Some(access_log_query::parser::FieldKind::Text)
    );
    assert!(record.lookup("host").is_none());
}

#[test]
fn test_glob_subject_forms() {
    let record = parse_access_line(GOOGLEBOT_LINE, &ParserRules::default()).expect("parses");

    assert_eq!(record.get(Field::Ip).to_string(), "66.249.73.135");
    assert_eq!(record.get(Field::Version).to_string(), "1.1");
    assert_eq!(
        record.get(Field::Datetime).to_string(),
        "2015-05-17 10:05:40+00:00"
    );
}

#[test]
fn test_timestamp_keeps_offset() {
    let line = GOOGLEBOT_LINE.replacen("+0000", "+0200", 1);
    let record = parse_access_line(&line, &ParserRules::default()).expect("parses");
    assert_eq!(record.datetime.to_rfc3339(), "2015-05-17T10:05:40+02:00");
}

#[test]
fn test_line_without_http_version_is_rejected() {
    let line = r#"10.0.0.1 - - [17/May/2015:10:05:40 +0000] "GET /" 400 0 "-" "-""#;
    assert!(matches!(
        parse_access_line(line, &ParserRules::default()),
        Err(ParseError::InvalidLogFormat)
    ));
}

#[test]
fn test_invalid_month_reports_datetime_field() {
    let line = GOOGLEBOT_LINE.replacen("May", "Foo", 1);
    match parse_access_line(&line, &ParserRules::default()) {
        Err(ParseError::InvalidField { field, .. }) => assert_eq!(field, Field::Datetime),
        other => panic!("expected a datetime error, got {other:?}"),
    }
}

#[test]
fn test_log_source_numbers_lines_and_keeps_failures() {
    let content = format!("{GOOGLEBOT_LINE}\r\n\nnot a log line\n{GOOGLEBOT_LINE}");
    let rules = ParserRules::default();
    let mut source = LogSource::new(Cursor::new(content.into_bytes()));

    let lines: Vec<_> = source
        .lines(&rules)
        .expect("rewind")
        .collect::<Result<Vec<_>, _>>()
        .expect("read");

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0].raw, GOOGLEBOT_LINE);
    assert!(lines[0].record.is_ok());
    assert!(lines[1].record.is_err());
    assert!(lines[2].record.is_err());
    assert_eq!(lines[3].line_number, 4);
    assert!(lines[3].record.is_ok());
}

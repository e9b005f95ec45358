use lazy_static::lazy_static;
use std::collections::HashSet;
use thiserror::Error;

/// Request methods accepted as the first token of the request field
/// (RFC 9110 methods plus the WebDAV and versioning extensions)
pub const HTTP_METHODS: &[&str] = &[
    "ACL",
    "BASELINE-CONTROL",
    "BIND",
    "CHECKIN",
    "CHECKOUT",
    "CONNECT",
    "COPY",
    "DELETE",
    "GET",
    "HEAD",
    "LABEL",
    "LINK",
    "LOCK",
    "MERGE",
    "MKACTIVITY",
    "MKCALENDAR",
    "MKCOL",
    "MKREDIRECTREF",
    "MKWORKSPACE",
    "MOVE",
    "OPTIONS",
    "ORDERPATCH",
    "PATCH",
    "POST",
    "PRI",
    "PROPFIND",
    "PROPPATCH",
    "PUT",
    "REBIND",
    "REPORT",
    "SEARCH",
    "TRACE",
    "UNBIND",
    "UNCHECKOUT",
    "UNLINK",
    "UNLOCK",
    "UPDATE",
    "UPDATEREDIRECTREF",
    "VERSION-CONTROL",
];

lazy_static! {
    static ref KNOWN_METHODS: HashSet<&'static str> = HTTP_METHODS.iter().copied().collect();
}

/// Why a single log line was rejected
///
/// These are never fatal: a rejected line only counts against the
/// parse-error budget.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no quoted request field")]
    NoRequestField,

    #[error("request field does not start with a known HTTP method")]
    UnknownMethod,

    #[error("request field has no path")]
    MissingPath,

    #[error("no response time after the request field")]
    MissingTime,

    #[error("response time is not an unsigned decimal number")]
    InvalidTime,

    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

/// The two fields of an access log line the report is built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRecord<'a> {
    pub url: &'a str,
    pub response_time: f64,
}

/// Parse one line of the `ui_short` nginx log format
///
/// The first quoted field must be a request line (`METHOD PATH PROTOCOL`) and
/// the last whitespace-separated token after it must be `$request_time`.
pub fn parse_line(line: &str) -> Result<LogRecord<'_>, ParseFailure> {
    let (request, rest) = split_request(line)?;
    let url = extract_url(request)?;
    let response_time = extract_response_time(rest)?;

    Ok(LogRecord { url, response_time })
}

/// Split a line into the first quoted field and the text after its closing quote
fn split_request(line: &str) -> Result<(&str, &str), ParseFailure> {
    let (_, after_open) = line.split_once('"').ok_or(ParseFailure::NoRequestField)?;
    after_open
        .split_once('"')
        .ok_or(ParseFailure::NoRequestField)
}

/// Extract the path from a request line, validating the method token
fn extract_url(request: &str) -> Result<&str, ParseFailure> {
    let mut tokens = request.split_whitespace();

    match tokens.next() {
        Some(method) if KNOWN_METHODS.contains(method) => {}
        _ => return Err(ParseFailure::UnknownMethod),
    }

    tokens.next().ok_or(ParseFailure::MissingPath)
}

/// Extract the trailing response time from the remainder of a line
fn extract_response_time(rest: &str) -> Result<f64, ParseFailure> {
    let token = rest
        .split_whitespace()
        .next_back()
        .ok_or(ParseFailure::MissingTime)?;

    let mut digits = token.chars().filter(|c| *c != '.').peekable();
    if digits.peek().is_none() || !digits.all(|c| c.is_ascii_digit()) {
        return Err(ParseFailure::InvalidTime);
    }

    // "1.2.3" passes the digit check but is still not a number
    token.parse::<f64>().map_err(|_| ParseFailure::InvalidTime)
}

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// One structured record extracted from a matched access-log line.
///
/// Only produced in field mode; substring mode never materializes a record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub ip: String,
    pub method: HttpMethod,
    pub endpoint: String,
    pub status_code: u16,
}

/// HTTP methods
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Other(String),
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Head => write!(f, "HEAD"),
            HttpMethod::Options => write!(f, "OPTIONS"),
            HttpMethod::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Dotted-quad IPv4 pattern. Deliberately does no range or width
/// validation: "999.999.999.999" matches, and a degenerate quad like
/// "9999.1.1.1" is taken whole. Addresses are text here, not numbers.
static IP_REGEX: OnceLock<Regex> = OnceLock::new();

fn ip_regex() -> &'static Regex {
    IP_REGEX.get_or_init(|| {
        Regex::new(r"\d+(?:\.\d+){3}").expect("hard-coded regex should always compile")
    })
}

/// Composite pattern for common-log-style lines:
///
///   IP ... "METHOD ENDPOINT [PROTOCOL]" STATUS ...
///
/// Example:
///   192.168.1.1 - - [15/Jan/2024:10:30:00 +0000] "GET /api/users HTTP/1.1" 200 512
static RECORD_REGEX: OnceLock<Regex> = OnceLock::new();

fn record_regex() -> &'static Regex {
    RECORD_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?P<ip>\d+(?:\.\d+){3})[^"]*"(?P<method>[A-Z]+)\s+(?P<endpoint>\S+)[^"]*"\s+(?P<status>\d{3})"#,
        )
        .expect("hard-coded regex should always compile")
    })
}

/// Find the first dotted-quad IP anywhere in the line.
///
/// Returns `None` for lines with no IP; such lines are skipped silently
/// upstream — an expected outcome, not an error.
pub fn extract_ip(line: &str) -> Option<&str> {
    ip_regex().find(line).map(|m| m.as_str())
}

/// Parse one line into a fixed-shape `LogRecord`.
///
/// Returns `None` if the composite pattern does not find all required
/// groups; unmatched lines are skipped silently upstream.
pub fn parse_record(line: &str) -> Option<LogRecord> {
    let caps = record_regex().captures(line)?;

    // The status group is exactly three digits, so this parse cannot
    // overflow a u16, but it is still routed through Option.
    let status_code = caps["status"].parse::<u16>().ok()?;

    Some(LogRecord {
        ip: caps["ip"].to_string(),
        method: parse_method(&caps["method"]),
        endpoint: caps["endpoint"].to_string(),
        status_code,
    })
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        "PATCH" => HttpMethod::Patch,
        "HEAD" => HttpMethod::Head,
        "OPTIONS" => HttpMethod::Options,
        other => HttpMethod::Other(other.to_string()),
    }
}

// ─── Unit Tests ──────────────────────────────────────────────────────────────

//! Accepted log line formats.
//!
//! Each format is a total matcher: it either extracts a record from a trimmed
//! line or declines it. Formats never fail loudly.

use std::sync::LazyLock;

use regex::Regex;

use super::LogRecord;

/// `SRC=<token> DST=<token> PROTO=<token> SIZE=<digits>` anywhere in the line,
/// field names case-insensitive. Digits are ASCII only; `\d` would accept any
/// Unicode digit.
static BRACKETED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)SRC=(\S+)\s+DST=(\S+)\s+PROTO=\S+\s+SIZE=([0-9]+)").unwrap()
});

/// Exactly `<src>,<dst>,<size>`. Tokens may not contain whitespace or commas.
static CSV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\s,]+),([^\s,]+),([0-9]+)$").unwrap());

/// The supported line formats, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// Firewall-style `[timestamp] SRC=.. DST=.. PROTO=.. SIZE=..`.
    Bracketed,
    /// Strict three-field `source,destination,size`.
    Csv,
    /// `SRC=`, `DST=` and `SIZE=` tokens in any order.
    TokenScan,
}

impl LineFormat {
    /// Priority order used by the parser. First match wins.
    pub const ORDERED: [LineFormat; 3] = [
        LineFormat::Bracketed,
        LineFormat::Csv,
        LineFormat::TokenScan,
    ];

    /// Try to extract a record from `line`, which must already be trimmed.
    pub fn extract(self, line: &str) -> Option<LogRecord> {
        match self {
            LineFormat::Bracketed => captures_to_record(&BRACKETED_RE, line),
            LineFormat::Csv => captures_to_record(&CSV_RE, line),
            LineFormat::TokenScan => scan_tokens(line),
        }
    }
}

impl std::fmt::Display for LineFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineFormat::Bracketed => write!(f, "bracketed"),
            LineFormat::Csv => write!(f, "csv"),
            LineFormat::TokenScan => write!(f, "token-scan"),
        }
    }
}

fn captures_to_record(re: &Regex, line: &str) -> Option<LogRecord> {
    let caps = re.captures(line)?;
    // A digit run too long for u64 is treated like any other non-matching line.
    let size_bytes = caps[3].parse::<u64>().ok()?;
    Some(LogRecord {
        source: caps[1].to_string(),
        destination: caps[2].to_string(),
        size_bytes,
        raw: line.to_string(),
    })
}

fn scan_tokens(line: &str) -> Option<LogRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let source = field_value(&tokens, "SRC=")?;
    let destination = field_value(&tokens, "DST=")?;
    let size = field_value(&tokens, "SIZE=")?;
    let size_bytes = size.parse::<u64>().ok()?;
    Some(LogRecord {
        source: source.to_string(),
        destination: destination.to_string(),
        size_bytes,
        raw: line.to_string(),
    })
}

/// Value of the first token starting with `prefix`, up to the next `=`.
/// Empty values count as missing.
fn field_value<'a>(tokens: &[&'a str], prefix: &str) -> Option<&'a str> {
    let token = tokens.iter().find(|t| t.starts_with(prefix))?;
    let value = token[prefix.len()..].split('=').next().unwrap_or_default();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

//! Line parser: free-text log lines into typed flow records.

pub mod formats;

use serde::Serialize;
use tracing::{debug, info};

pub use formats::LineFormat;

/// One successfully parsed log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub source: String,
    pub destination: String,
    pub size_bytes: u64,
    /// The trimmed input line, kept for traceability.
    pub raw: String,
}

/// Line counts from a parse pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Non-empty lines seen.
    pub lines: usize,
    pub parsed: usize,
    /// Non-empty lines no format accepted.
    pub skipped: usize,
}

/// Parse a single trimmed line, trying each format in priority order.
pub fn parse_line(line: &str) -> Option<LogRecord> {
    match_line(line).map(|(_, record)| record)
}

/// Like [`parse_line`], also returning the format that accepted the line.
pub fn match_line(line: &str) -> Option<(LineFormat, LogRecord)> {
    LineFormat::ORDERED
        .iter()
        .find_map(|&format| format.extract(line).map(|record| (format, record)))
}

/// Lazily parse `text`, yielding records in input order.
pub fn records(text: &str) -> impl Iterator<Item = LogRecord> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(parse_line)
}

/// Parse every line of `text`. Unrecognised lines are dropped.
pub fn parse(text: &str) -> Vec<LogRecord> {
    parse_with_stats(text).0
}

/// Like [`parse`], also reporting how many lines were skipped.
pub fn parse_with_stats(text: &str) -> (Vec<LogRecord>, ParseStats) {
    let mut stats = ParseStats::default();
    let mut out = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;
        match match_line(line) {
            Some((format, record)) => {
                debug!(line_no = idx + 1, %format, "parsed line");
                out.push(record);
            }
            None => {
                stats.skipped += 1;
                debug!(line_no = idx + 1, %line, "no format matched, skipping line");
            }
        }
    }

    stats.parsed = out.len();
    info!(
        lines = stats.lines,
        parsed = stats.parsed,
        skipped = stats.skipped,
        "parsed log input"
    );
    (out, stats)
}

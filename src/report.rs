//! Alert formatting for terminal output and CSV export.

use std::path::Path;

use anyhow::{Context, Result};

use crate::detect::Alert;

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 4] = ["Source", "Destination", "Bytes", "Reason"];

/// Format an alert as a single human-readable line.
pub fn format_alert(alert: &Alert) -> String {
    format!(
        "ALERT: {} → {} - {} (bytes={})",
        alert.source, alert.destination, alert.reason, alert.total_bytes
    )
}

/// Quote a CSV field, doubling embedded quotes.
pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render alerts as CSV: a header row then one row per alert, every field quoted.
pub fn to_csv(alerts: &[Alert]) -> String {
    let mut rows = Vec::with_capacity(alerts.len() + 1);
    rows.push(csv_row(&CSV_HEADER));
    for alert in alerts {
        rows.push(csv_row(&[
            alert.source.clone(),
            alert.destination.clone(),
            alert.total_bytes.to_string(),
            alert.reason.to_string(),
        ]));
    }
    rows.join("\n")
}

/// Write the CSV export to `path`.
pub fn write_csv(path: &Path, alerts: &[Alert]) -> Result<()> {
    std::fs::write(path, to_csv(alerts))
        .with_context(|| format!("failed to write CSV report: {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = alerts.len(), "wrote CSV report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::AlertReason;

    fn alert(src: &str, reason: AlertReason) -> Alert {
        Alert {
            source: src.to_string(),
            destination: "104.27.122.12".to_string(),
            total_bytes: 9937,
            reason,
        }
    }

    #[test]
    fn test_format_alert() {
        let line = format_alert(&alert(
            "192.168.10.22",
            AlertReason::IncreasingRun { run_length: 3 },
        ));
        assert_eq!(
            line,
            "ALERT: 192.168.10.22 → 104.27.122.12 - 3 increasing packets (bytes=9937)"
        );
    }

    #[test]
    fn test_csv_quotes_every_field() {
        let csv = to_csv(&[alert(
            "10.0.0.1",
            AlertReason::ByteThresholdExceeded { threshold: 10 },
        )]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], r#""Source","Destination","Bytes","Reason""#);
        assert_eq!(
            lines[1],
            r#""10.0.0.1","104.27.122.12","9937","bytes > threshold""#
        );
    }

    #[test]
    fn test_csv_escapes_quotes() {
        assert_eq!(csv_field(r#"say "hi""#), r#""say ""hi""""#);
        let csv = to_csv(&[alert(
            r#"a"b"#,
            AlertReason::IncreasingRun { run_length: 4 },
        )]);
        assert!(csv.contains(r#""a""b""#));
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        assert_eq!(to_csv(&[]), r#""Source","Destination","Bytes","Reason""#);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        write_csv(&path, &[alert("x", AlertReason::IncreasingRun { run_length: 3 })]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}

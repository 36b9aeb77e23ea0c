//! PacketGuardian -- heuristic flow anomaly detection for free-text network logs.
//!
//! The pipeline is three pure stages: [`ingest::parse`] turns text into
//! records, [`flow::aggregate`] groups them into directed flows, and
//! [`detect::detect`] flags flows by byte volume or increasing packet sizes.

pub mod config;
pub mod detect;
pub mod flow;
pub mod ingest;
pub mod report;

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, DetectionConfig};
use crate::detect::{Alert, Detector};
use crate::ingest::ParseStats;

/// Demo input in the bracketed firewall format.
pub const SAMPLE_LOG: &str = "\
[2025-11-04 09:00:12] SRC=192.168.10.22 DST=8.8.8.8 PROTO=DNS SIZE=84
[2025-11-04 09:00:13] SRC=192.168.10.22 DST=104.27.122.12 PROTO=HTTP SIZE=512
[2025-11-04 09:00:14] SRC=192.168.10.22 DST=104.27.122.12 PROTO=HTTP SIZE=525
[2025-11-04 09:00:15] SRC=192.168.10.22 DST=104.27.122.12 PROTO=HTTP SIZE=540
[2025-11-04 09:00:16] SRC=192.168.10.22 DST=104.27.122.12 PROTO=HTTP SIZE=560
[2025-11-04 09:00:18] SRC=192.168.10.22 DST=104.27.122.12 PROTO=HTTP SIZE=1200
[2025-11-04 09:00:19] SRC=192.168.10.22 DST=104.27.122.12 PROTO=HTTP SIZE=1300
[2025-11-04 09:00:20] SRC=192.168.10.22 DST=104.27.122.12 PROTO=HTTP SIZE=1500
[2025-11-04 09:00:21] SRC=192.168.10.22 DST=104.27.122.12 PROTO=HTTP SIZE=1900
[2025-11-04 09:00:22] SRC=192.168.10.22 DST=104.27.122.12 PROTO=HTTP SIZE=2000
";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("Paste logs or provide a file first.")]
    EmptyInput,
    #[error(
        "no parsable log lines found ({skipped} skipped); expected e.g. \
         SRC=1.2.3.4 DST=5.6.7.8 PROTO=HTTP SIZE=512"
    )]
    NoParsableLines { skipped: usize },
    #[error("invalid detection config: {0}")]
    Config(#[from] ConfigError),
}

/// Result of one scan, suitable for JSON output.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub config: DetectionConfig,
    pub stats: ParseStats,
    pub flows: usize,
    pub alerts: Vec<Alert>,
}

/// Parse, aggregate and detect in one call.
///
/// Empty or unparsable input simply yields no alerts. Configuration is
/// validated before any work is done.
pub fn run(text: &str, config: &DetectionConfig) -> Result<Vec<Alert>, ConfigError> {
    let detector = Detector::from_config(config)?;
    let flows = flow::aggregate(ingest::records(text));
    Ok(detector.detect(&flows))
}

/// Like [`run`], but distinguishes empty and unparsable input and keeps
/// line statistics for the caller.
pub fn scan(text: &str, config: &DetectionConfig) -> Result<ScanReport, ScanError> {
    let detector = Detector::from_config(config)?;

    if text.trim().is_empty() {
        return Err(ScanError::EmptyInput);
    }

    let (records, stats) = ingest::parse_with_stats(text);
    if records.is_empty() {
        return Err(ScanError::NoParsableLines {
            skipped: stats.skipped,
        });
    }

    let flows = flow::aggregate(records);
    let alerts = detector.detect(&flows);

    Ok(ScanReport {
        id: uuid::Uuid::new_v4(),
        created_at: chrono::Utc::now(),
        config: config.clone(),
        stats,
        flows: flows.len(),
        alerts,
    })
}

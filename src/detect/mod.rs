//! Anomaly detection over aggregated flows.

pub mod engine;
pub mod rules;

use serde::Serialize;

use crate::config::{ConfigError, DetectionConfig};
use crate::flow::FlowTable;

pub use engine::Detector;
pub use rules::{ByteThresholdRule, IncreasingRunRule, Rule};

/// Why a flow was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertReason {
    /// Total bytes reached the configured threshold.
    ByteThresholdExceeded { threshold: u64 },
    /// `run_length` consecutive packet sizes strictly increased.
    IncreasingRun { run_length: usize },
}

impl std::fmt::Display for AlertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertReason::ByteThresholdExceeded { .. } => write!(f, "bytes > threshold"),
            AlertReason::IncreasingRun { run_length } => {
                write!(f, "{} increasing packets", run_length)
            }
        }
    }
}

/// A flagged flow. At most one per flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub source: String,
    pub destination: String,
    /// Total bytes of the whole flow, whichever rule fired.
    pub total_bytes: u64,
    pub reason: AlertReason,
}

/// Evaluate every flow against the default rule list built from `config`.
pub fn detect(flows: &FlowTable, config: &DetectionConfig) -> Result<Vec<Alert>, ConfigError> {
    Ok(Detector::from_config(config)?.detect(flows))
}

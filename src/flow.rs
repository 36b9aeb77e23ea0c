//! Flow aggregation: group records by directed endpoint pair.
//!
//! Log lines carry no reliable per-record time, so each record gets a
//! synthetic timestamp of `run_start + position within its flow`.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::ingest::LogRecord;

/// Directed `(source, destination)` pair. `A -> B` and `B -> A` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FlowKey {
    pub source: String,
    pub destination: String,
}

impl FlowKey {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Packet sizes and synthetic timestamps seen on one directed pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flow {
    pub source: String,
    pub destination: String,
    sizes: Vec<u64>,
    timestamps: Vec<f64>,
    #[serde(skip)]
    run_start: f64,
}

impl Flow {
    fn new(key: &FlowKey, run_start: f64) -> Self {
        Self {
            source: key.source.clone(),
            destination: key.destination.clone(),
            sizes: Vec::new(),
            timestamps: Vec::new(),
            run_start,
        }
    }

    /// Append one observation. Both sequences grow together.
    fn push(&mut self, size_bytes: u64) {
        self.timestamps.push(self.run_start + self.sizes.len() as f64);
        self.sizes.push(size_bytes);
    }

    pub fn sizes(&self) -> &[u64] {
        &self.sizes
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Sum of all sizes in the flow, saturating at `u64::MAX`.
    pub fn total_bytes(&self) -> u64 {
        self.sizes.iter().fold(0u64, |acc, &s| acc.saturating_add(s))
    }
}

/// Flows of one run, ordered by `(source, destination)`.
pub type FlowTable = BTreeMap<FlowKey, Flow>;

/// Current wall-clock time as fractional Unix seconds.
pub fn now_unix_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Group `records` into flows, anchoring synthetic timestamps at the current time.
pub fn aggregate<I>(records: I) -> FlowTable
where
    I: IntoIterator<Item = LogRecord>,
{
    aggregate_at(records, now_unix_seconds())
}

/// Group `records` into flows with an explicit run start (Unix seconds).
pub fn aggregate_at<I>(records: I, run_start: f64) -> FlowTable
where
    I: IntoIterator<Item = LogRecord>,
{
    let mut flows = FlowTable::new();
    let mut total = 0usize;

    for record in records {
        let key = FlowKey {
            source: record.source,
            destination: record.destination,
        };
        match flows.get_mut(&key) {
            Some(flow) => flow.push(record.size_bytes),
            None => {
                let mut flow = Flow::new(&key, run_start);
                flow.push(record.size_bytes);
                flows.insert(key, flow);
            }
        }
        total += 1;
    }

    info!(records = total, flows = flows.len(), "aggregated flows");
    flows
}

use crate::detect::AlertReason;
use crate::flow::Flow;

/// A single detection heuristic. Rules are evaluated in list order and the
/// first one that fires decides the alert for a flow.
pub trait Rule: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn evaluate(&self, flow: &Flow) -> Option<AlertReason>;
}

/// Fires when a flow's total bytes meet or exceed `threshold`.
#[derive(Debug, Clone)]
pub struct ByteThresholdRule {
    pub threshold: u64,
}

impl Rule for ByteThresholdRule {
    fn name(&self) -> &'static str {
        "byte-threshold"
    }

    fn evaluate(&self, flow: &Flow) -> Option<AlertReason> {
        if flow.total_bytes() >= self.threshold {
            Some(AlertReason::ByteThresholdExceeded {
                threshold: self.threshold,
            })
        } else {
            None
        }
    }
}

/// Fires when some window of `run_length` consecutive sizes is strictly increasing.
/// `run_length` must be at least 2; the detector validates this.
#[derive(Debug, Clone)]
pub struct IncreasingRunRule {
    pub run_length: usize,
}

impl IncreasingRunRule {
    /// Start index of the first strictly increasing window, if any.
    pub fn first_run(&self, sizes: &[u64]) -> Option<usize> {
        if self.run_length < 2 || sizes.len() < self.run_length {
            return None;
        }
        sizes
            .windows(self.run_length)
            .position(|w| w.windows(2).all(|pair| pair[0] < pair[1]))
    }
}

impl Rule for IncreasingRunRule {
    fn name(&self) -> &'static str {
        "increasing-run"
    }

    fn evaluate(&self, flow: &Flow) -> Option<AlertReason> {
        self.first_run(flow.sizes())
            .map(|_| AlertReason::IncreasingRun {
                run_length: self.run_length,
            })
    }
}

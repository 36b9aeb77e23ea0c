use tracing::{debug, info};

use crate::config::{ConfigError, DetectionConfig};
use crate::detect::rules::{ByteThresholdRule, IncreasingRunRule, Rule};
use crate::detect::Alert;
use crate::flow::FlowTable;

/// Applies an ordered rule list to each flow, emitting at most one alert per flow.
pub struct Detector {
    rules: Vec<Box<dyn Rule>>,
}

impl Detector {
    /// Default rule list: byte threshold first, then increasing run.
    pub fn from_config(config: &DetectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rules: vec![
                Box::new(ByteThresholdRule {
                    threshold: config.byte_threshold,
                }) as Box<dyn Rule>,
                Box::new(IncreasingRunRule {
                    run_length: config.increasing_run_length,
                }) as Box<dyn Rule>,
            ],
        })
    }

    /// Append a rule with the lowest priority so far.
    pub fn with_rule(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Evaluate every flow. Alerts come out in flow-table order.
    pub fn detect(&self, flows: &FlowTable) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for flow in flows.values() {
            let hit = self
                .rules
                .iter()
                .find_map(|rule| rule.evaluate(flow).map(|reason| (rule.name(), reason)));

            if let Some((rule, reason)) = hit {
                debug!(
                    source = %flow.source,
                    destination = %flow.destination,
                    rule,
                    "flow flagged"
                );
                alerts.push(Alert {
                    source: flow.source.clone(),
                    destination: flow.destination.clone(),
                    total_bytes: flow.total_bytes(),
                    reason,
                });
            }
        }

        info!(flows = flows.len(), alerts = alerts.len(), "detection complete");
        alerts
    }
}

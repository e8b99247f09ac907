//! Background polling cadence

use serde::{Deserialize, Serialize};

/// Intervals of the two panel loops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Broker connectivity check interval
    pub status_interval_ms: u64,
    /// Detection fetch + dispatch interval
    pub detection_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: 5000,
            detection_interval_ms: 1000,
        }
    }
}

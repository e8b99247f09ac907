//! Conveyor readiness ping configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of the PING / READY handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Give up and report TIMEOUT after this many milliseconds
    pub timeout_ms: u64,
    /// Cadence of status-feed polls while waiting
    pub poll_interval_ms: u64,
}

impl ReadinessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            poll_interval_ms: 500,
        }
    }
}

//! Broker feed and conveyor configuration

use serde::{Deserialize, Serialize};

/// Feed names and the conveyors reachable through the broker gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Feed that carries action commands to a conveyor
    pub command_feed: String,
    /// Feed a conveyor reports its status on
    pub status_feed: String,
    /// Known conveyor ids; the first one is selected at startup
    pub conveyors: Vec<String>,
    /// Topic the emergency stop is published to
    pub emergency_topic: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            command_feed: "V1".to_string(),
            status_feed: "V2".to_string(),
            conveyors: vec![
                "0_SmartConvey2025".to_string(),
                "1_SmartConvey2025".to_string(),
            ],
            emergency_topic: "emergency".to_string(),
        }
    }
}

/// Activity log retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLogConfig {
    /// Maximum retained entries, oldest dropped first (0 = unbounded)
    pub max_entries: usize,
}

impl Default for ActivityLogConfig {
    fn default() -> Self {
        Self { max_entries: 500 }
    }
}

//! Detection-to-action dispatch configuration

use serde::{Deserialize, Serialize};

/// Cooldown tuning for color-driven conveyor actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Extra cooldown added on top of an action's duration
    pub grace_ms: u64,
    /// Fill in missing action id / duration from the built-in color table
    pub fallback_colors: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            grace_ms: 500,
            fallback_colors: false,
        }
    }
}

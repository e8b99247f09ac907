//! `[logging]` section

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Modules that accept their own level under `[logging.component_levels]`.
pub const COMPONENTS: &[&str] = &[
    "broker",
    "camera",
    "cli",
    "client",
    "colors",
    "config",
    "conveyor",
    "detection",
    "panel",
];

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Where stderr logs are meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Operator at a terminal
    #[default]
    Pretty,
    /// Line-delimited JSON for a log shipper
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "Unknown log format: {}. Valid options: pretty, json",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level for every `cellctl` module
    pub level: String,
    pub format: LogFormat,
    /// Per-module overrides, e.g. `conveyor = "debug"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<HashMap<String, String>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
        }
    }
}

impl LoggingConfig {
    /// Reject levels and component names the filter would silently ignore.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_level(&self.level) {
            return Err(ConfigError::invalid(
                "logging.level",
                format!("unknown level '{}'", self.level),
            ));
        }

        let Some(levels) = &self.component_levels else {
            return Ok(());
        };
        let mut names: Vec<_> = levels.keys().collect();
        names.sort();
        for name in names {
            let field = format!("logging.component_levels.{}", name);
            if !COMPONENTS.contains(&name.as_str()) {
                return Err(ConfigError::invalid(
                    field,
                    format!("no such component (known: {})", COMPONENTS.join(", ")),
                ));
            }
            if !is_level(&levels[name]) {
                return Err(ConfigError::invalid(
                    field,
                    format!("unknown level '{}'", levels[name]),
                ));
            }
        }
        Ok(())
    }
}

fn is_level(level: &str) -> bool {
    LEVELS.contains(&level.trim().to_lowercase().as_str())
}

//! Configuration module for cellctl
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`CELLCTL_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use cellctl::config::PanelConfig;
//!
//! let config = PanelConfig::default();
//! assert_eq!(config.readiness.timeout_ms, 5000);
//!
//! let toml = r#"
//! [backend]
//! base_url = "http://factory.local:5000"
//! "#;
//! let config: PanelConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.backend.base_url, "http://factory.local:5000");
//! ```

pub mod backend;
pub mod broker;
pub mod camera;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod polling;
pub mod readiness;

pub use backend::BackendConfig;
pub use broker::{ActivityLogConfig, BrokerConfig};
pub use camera::{CameraConfig, CameraKind};
pub use dispatch::DispatchConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use polling::PollingConfig;
pub use readiness::ReadinessConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the control panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PanelConfig {
    /// Factory-cell backend location
    pub backend: BackendConfig,
    /// Broker feeds and conveyors
    pub broker: BrokerConfig,
    /// PING / READY handshake timing
    pub readiness: ReadinessConfig,
    /// Background loop cadence
    pub polling: PollingConfig,
    /// Action cooldown tuning
    pub dispatch: DispatchConfig,
    /// Camera source
    pub camera: CameraConfig,
    /// Activity log retention
    pub activity_log: ActivityLogConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl PanelConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: p.to_path_buf(),
                    message: e.to_string(),
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports CELLCTL_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("CELLCTL_BASE_URL") {
            self.backend.base_url = url;
        }
        if let Ok(timeout) = std::env::var("CELLCTL_TIMEOUT_MS") {
            if let Ok(t) = timeout.parse() {
                self.backend.timeout_ms = t;
            }
        }

        if let Ok(level) = std::env::var("CELLCTL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CELLCTL_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(kind) = std::env::var("CELLCTL_CAMERA_KIND") {
            if let Ok(k) = kind.parse() {
                self.camera.kind = k;
            }
        }
        if let Ok(url) = std::env::var("CELLCTL_RTSP_URL") {
            self.camera.rtsp_url = url;
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.backend.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "backend.base_url",
                "must be an http:// or https:// URL",
            ));
        }
        if self.backend.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "backend.timeout_ms",
                "timeout must be non-zero",
            ));
        }

        if self.broker.command_feed.is_empty() || self.broker.status_feed.is_empty() {
            return Err(ConfigError::invalid("broker", "feed names cannot be empty"));
        }
        for (i, conveyor) in self.broker.conveyors.iter().enumerate() {
            if conveyor.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("broker.conveyors[{}]", i),
                    "conveyor id cannot be empty",
                ));
            }
        }

        let intervals = [
            ("readiness.timeout_ms", self.readiness.timeout_ms),
            ("readiness.poll_interval_ms", self.readiness.poll_interval_ms),
            ("polling.status_interval_ms", self.polling.status_interval_ms),
            (
                "polling.detection_interval_ms",
                self.polling.detection_interval_ms,
            ),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigError::invalid(field, "interval must be non-zero"));
            }
        }

        self.logging.validate()
    }
}

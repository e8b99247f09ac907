//! Colored status indicators for the camera and broker connection.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Indicator lamp color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorColor {
    Green,
    Red,
    Gray,
}

/// A lamp plus its label, e.g. green "MQTT Online".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub color: IndicatorColor,
    pub label: String,
}

impl Indicator {
    pub fn new(color: IndicatorColor, label: impl Into<String>) -> Self {
        Self {
            color,
            label: label.into(),
        }
    }

    /// Broker connectivity lamp.
    pub fn broker(connected: bool) -> Self {
        if connected {
            Self::new(IndicatorColor::Green, "MQTT Online")
        } else {
            Self::new(IndicatorColor::Red, "MQTT Offline")
        }
    }

    /// Broker lamp before the first successful status poll.
    pub fn broker_unknown() -> Self {
        Self::new(IndicatorColor::Gray, "MQTT Unknown")
    }

    pub fn camera_running() -> Self {
        Self::new(IndicatorColor::Green, "Camera Running")
    }

    pub fn camera_error() -> Self {
        Self::new(IndicatorColor::Red, "Camera Error")
    }

    pub fn camera_stopped() -> Self {
        Self::new(IndicatorColor::Gray, "Camera Stopped")
    }

    /// Render for a terminal with a colored bullet.
    pub fn render(&self) -> String {
        let lamp = match self.color {
            IndicatorColor::Green => "●".green(),
            IndicatorColor::Red => "●".red(),
            IndicatorColor::Gray => "●".dimmed(),
        };
        format!("{} {}", lamp, self.label)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

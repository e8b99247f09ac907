//! Color rule records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven colors the detector can label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    #[default]
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Purple,
    Pink,
}

impl ColorName {
    pub const ALL: [ColorName; 7] = [
        ColorName::Red,
        ColorName::Green,
        ColorName::Blue,
        ColorName::Yellow,
        ColorName::Orange,
        ColorName::Purple,
        ColorName::Pink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorName::Red => "red",
            ColorName::Green => "green",
            ColorName::Blue => "blue",
            ColorName::Yellow => "yellow",
            ColorName::Orange => "orange",
            ColorName::Purple => "purple",
            ColorName::Pink => "pink",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ColorName::ALL
            .into_iter()
            .find(|color| color.as_str() == lower)
            .ok_or_else(|| {
                format!(
                    "Unknown color: {}. Valid options: red, green, blue, yellow, orange, purple, pink",
                    s
                )
            })
    }
}

/// One row of the color → action mapping.
///
/// Action ids are expected in 1..=10 and durations in 2000..=10000 ms;
/// the backend enforces these, not this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRule {
    pub name: ColorName,
    pub action_id: u32,
    pub duration_ms: u64,
}

impl Default for ColorRule {
    fn default() -> Self {
        Self {
            name: ColorName::Red,
            action_id: 0,
            duration_ms: 1000,
        }
    }
}

/// A rule as stored by the backend, before defaults are applied.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub action_id: Option<u32>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl From<StoredRule> for ColorRule {
    fn from(stored: StoredRule) -> Self {
        let defaults = ColorRule::default();
        Self {
            name: stored
                .name
                .and_then(|name| name.parse().ok())
                .unwrap_or(defaults.name),
            action_id: stored.action_id.unwrap_or(defaults.action_id),
            duration_ms: stored.duration_ms.unwrap_or(defaults.duration_ms),
        }
    }
}

/// Response of `GET /api/colors/`.
#[derive(Debug, Deserialize)]
pub(crate) struct ColorsResponse {
    #[serde(default)]
    pub colors: Vec<StoredRule>,
}

/// Response of `POST /api/colors/`.
#[derive(Debug, Deserialize)]
pub(crate) struct SaveResponse {
    #[serde(default)]
    pub status: Option<String>,
}

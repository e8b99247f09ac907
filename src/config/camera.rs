//! Camera source configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of capture source the backend should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraKind {
    #[default]
    Usb,
    Rtsp,
}

impl FromStr for CameraKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usb" => Ok(CameraKind::Usb),
            "rtsp" => Ok(CameraKind::Rtsp),
            _ => Err(format!("Invalid camera kind: {}", s)),
        }
    }
}

/// Camera source selection used when the panel starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub kind: CameraKind,
    /// Device index for USB cameras
    pub usb_index: u32,
    /// Stream URL for RTSP cameras
    pub rtsp_url: String,
    /// Start the camera session as part of panel initialization
    pub auto_start: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            kind: CameraKind::Usb,
            usb_index: 0,
            rtsp_url: String::new(),
            auto_start: true,
        }
    }
}

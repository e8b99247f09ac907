//! Capture source descriptors.

use crate::client::ClientError;
use crate::config::{CameraConfig, CameraKind};
use serde::Serialize;
use std::fmt;

/// What the backend should open, sent as the `src` field of a start request.
///
/// Serializes as a bare number for USB devices and a bare string for RTSP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CameraSource {
    Usb(u32),
    Rtsp(String),
}

impl CameraSource {
    /// Source selected by the configuration.
    pub fn from_config(config: &CameraConfig) -> Self {
        match config.kind {
            CameraKind::Usb => CameraSource::Usb(config.usb_index),
            CameraKind::Rtsp => CameraSource::Rtsp(config.rtsp_url.trim().to_string()),
        }
    }

    /// RTSP sources need a non-blank URL.
    pub fn validate(&self) -> Result<(), ClientError> {
        match self {
            CameraSource::Rtsp(url) if url.trim().is_empty() => Err(ClientError::Validation(
                "an RTSP URL is required for RTSP cameras".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for CameraSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraSource::Usb(index) => write!(f, "usb:{}", index),
            CameraSource::Rtsp(url) => write!(f, "{}", url),
        }
    }
}

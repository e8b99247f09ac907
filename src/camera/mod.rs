//! Camera session control.
//!
//! The backend owns the capture device; this module asks it to start or stop
//! and tracks the resulting running flag, stream URL and status lamp.
//! Detection polling is gated on [`CameraSession::is_running`].

mod source;
mod view;

pub use source::CameraSource;
pub use view::{Rotation, ViewTransform};

use crate::client::{endpoints, ApiClient, ClientError};
use crate::indicator::Indicator;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// A capture device the backend can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub index: u32,
    pub name: String,
}

#[derive(Serialize)]
struct StartRequest<'a> {
    src: &'a CameraSource,
}

#[derive(Deserialize)]
struct StartResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct CameraListResponse {
    #[serde(default)]
    cameras: Vec<CameraInfo>,
}

/// Client-side view of the backend camera session.
pub struct CameraSession {
    api: Arc<ApiClient>,
    running: AtomicBool,
    stream_url: RwLock<Option<String>>,
    indicator: RwLock<Indicator>,
    view: RwLock<ViewTransform>,
}

impl CameraSession {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            running: AtomicBool::new(false),
            stream_url: RwLock::new(None),
            indicator: RwLock::new(Indicator::camera_stopped()),
            view: RwLock::new(ViewTransform::default()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// MJPEG stream URL while running.
    pub fn stream_url(&self) -> Option<String> {
        self.stream_url
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Ask the backend to open `source`.
    ///
    /// An RTSP source without URL fails with [`ClientError::Validation`]
    /// before any request is made. Every other failure (transport, HTTP
    /// status, malformed JSON, non-success status) leaves the session
    /// stopped with a red indicator.
    pub async fn start(&self, source: &CameraSource) -> Result<(), ClientError> {
        self.running.store(false, Ordering::SeqCst);
        source.validate()?;

        tracing::info!(source = %source, "Starting camera");

        let result = self
            .api
            .post_json::<_, StartResponse>(endpoints::CAMERA_START, &StartRequest { src: source })
            .await
            .and_then(|response| match response.status.as_deref() {
                Some("success") => Ok(()),
                _ => Err(ClientError::Rejected(
                    response
                        .message
                        .unwrap_or_else(|| "camera did not start".to_string()),
                )),
            });

        match result {
            Ok(()) => {
                self.set_stream(Some(self.api.url(endpoints::CAMERA_STREAM)));
                self.set_indicator(Indicator::camera_running());
                self.running.store(true, Ordering::SeqCst);
                tracing::info!(source = %source, "Camera running");
                Ok(())
            }
            Err(e) => {
                self.set_stream(None);
                self.set_indicator(Indicator::camera_error());
                tracing::warn!(source = %source, error = %e, "Camera failed to start");
                Err(e)
            }
        }
    }

    /// Ask the backend to stop capturing. Always ends in the stopped state.
    pub async fn stop(&self) {
        if let Err(e) = self.api.post_empty(endpoints::CAMERA_STOP).await {
            tracing::warn!(error = %e, "Camera stop request failed");
        }

        self.running.store(false, Ordering::SeqCst);
        self.set_stream(None);
        self.set_indicator(Indicator::camera_stopped());
        *self.view.write().unwrap_or_else(|e| e.into_inner()) = ViewTransform::default();
        tracing::info!("Camera stopped");
    }

    /// Capture devices the backend can see; empty when the list is unavailable.
    pub async fn list_cameras(&self) -> Vec<CameraInfo> {
        match self
            .api
            .get_json::<CameraListResponse>(endpoints::CAMERA_LIST)
            .await
        {
            Ok(response) => response.cameras,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load camera list");
                Vec::new()
            }
        }
    }

    pub fn view(&self) -> ViewTransform {
        *self.view.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Change the display transform and return the new value.
    pub fn update_view(&self, change: impl FnOnce(&mut ViewTransform)) -> ViewTransform {
        let mut view = self.view.write().unwrap_or_else(|e| e.into_inner());
        change(&mut view);
        *view
    }

    fn set_stream(&self, url: Option<String>) {
        *self.stream_url.write().unwrap_or_else(|e| e.into_inner()) = url;
    }

    fn set_indicator(&self, indicator: Indicator) {
        *self.indicator.write().unwrap_or_else(|e| e.into_inner()) = indicator;
    }
}

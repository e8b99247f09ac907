//! HTTP access to the factory-cell backend.
//!
//! All component clients (broker gateway, camera, color rules) share one
//! [`ApiClient`] so they reuse a single connection pool and error mapping.

mod error;

pub use error::ClientError;

use crate::config::BackendConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Backend endpoint paths.
pub mod endpoints {
    pub const CAMERA_START: &str = "/api/camera/start";
    pub const CAMERA_STOP: &str = "/api/camera/stop";
    pub const CAMERA_STREAM: &str = "/api/camera/stream";
    pub const CAMERA_DETECTIONS: &str = "/api/camera/detections";
    pub const CAMERA_LIST: &str = "/api/camera/list";
    pub const MQTT_STATUS: &str = "/api/mqtt/status";
    pub const MQTT_PUBLISH: &str = "/api/mqtt/publish";
    pub const MQTT_MESSAGES: &str = "/api/mqtt/messages";
    pub const COLORS: &str = "/api/colors/";
}

/// Thin JSON client bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client with connection pooling
    http: reqwest::Client,
    /// Base URL without trailing slash
    base_url: String,
    /// Request timeout, kept for error reporting
    timeout_ms: u64,
}

impl ApiClient {
    /// Create a client from backend configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self::with_client(config, http))
    }

    /// Create a client around an existing reqwest client (for testing).
    pub fn with_client(config: &BackendConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a backend path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a path and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.http.get(self.url(path));
        self.send_json(request).await
    }

    /// GET a path with query parameters and decode the JSON body.
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let request = self.http.get(self.url(path)).query(query);
        self.send_json(request).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        self.send_json(request).await
    }

    /// POST without a body, only checking the response status.
    pub async fn post_empty(&self, path: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url(path))
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout_ms))?;

        if !response.status().is_success() {
            return Err(ClientError::Http(response.status().as_u16()));
        }
        Ok(())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout_ms))?;

        serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

//! Shared helpers for cellctl integration tests.
//!
//! Every test runs against a `wiremock` server standing in for the
//! factory-cell backend.

#![allow(dead_code)]

use cellctl::client::ApiClient;
use cellctl::config::{BackendConfig, PanelConfig};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub fn backend_config(server: &MockServer) -> BackendConfig {
    BackendConfig {
        base_url: server.uri(),
        timeout_ms: 2000,
    }
}

pub fn api(server: &MockServer) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(&backend_config(server)).unwrap())
}

/// Panel configuration with fast loops and a short readiness deadline.
pub fn panel_config(server: &MockServer) -> PanelConfig {
    let mut config = PanelConfig::default();
    config.backend = backend_config(server);
    config.polling.status_interval_ms = 50;
    config.polling.detection_interval_ms = 50;
    config.readiness.timeout_ms = 1000;
    config.readiness.poll_interval_ms = 50;
    config
}

pub async fn mount_publish_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/mqtt/publish"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .mount(server)
        .await;
}

pub async fn mount_camera_start_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/camera/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .mount(server)
        .await;
}

pub async fn mount_camera_stop_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/camera/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .mount(server)
        .await;
}

pub async fn mount_detections(server: &MockServer, detections: Value) {
    Mock::given(method("GET"))
        .and(path("/api/camera/detections"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "detections": detections})),
        )
        .mount(server)
        .await;
}

pub async fn mount_broker_status(server: &MockServer, connected: bool) {
    Mock::given(method("GET"))
        .and(path("/api/mqtt/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"connected": connected}})),
        )
        .mount(server)
        .await;
}

/// `(topic, message)` of every publish the server received, in order.
pub async fn published_messages(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == "/api/mqtt/publish")
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            (
                body["topic"].as_str().unwrap_or_default().to_string(),
                body["message"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

/// Number of requests the server received for `request_path`.
pub async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

/// A color store that serves whatever was last posted to it.
#[derive(Clone)]
pub struct ColorStore {
    rules: Arc<Mutex<Value>>,
}

impl ColorStore {
    pub fn new(initial: Value) -> Self {
        Self {
            rules: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn stored(&self) -> Value {
        self.rules.lock().unwrap().clone()
    }

    pub async fn mount(&self, server: &MockServer) {
        Mock::given(path("/api/colors/"))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }
}

impl Respond for ColorStore {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if request.method.as_str() == "POST" {
            match serde_json::from_slice::<Value>(&request.body) {
                Ok(rules) => {
                    *self.rules.lock().unwrap() = rules;
                    ResponseTemplate::new(200).set_body_json(json!({"status": "success"}))
                }
                Err(_) => ResponseTemplate::new(400).set_body_json(json!({"status": "error"})),
            }
        } else {
            ResponseTemplate::new(200).set_body_json(json!({"colors": self.stored()}))
        }
    }
}

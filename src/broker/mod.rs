//! Message-broker access through the backend's HTTP gateway.
//!
//! The panel never talks MQTT directly: publishing is a POST to the gateway
//! and receiving means asking the gateway for the last message it saw on a
//! topic. Every message in either direction is written to the
//! [`ActivityLog`].

mod log;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use log::{ActivityLog, Direction, LogEntry};
pub use types::{Command, Message};

use crate::client::{endpoints, ApiClient, ClientError};
use async_trait::async_trait;
use std::sync::Arc;
use types::{LastMessageResponse, PublishRequest, PublishResponse, StatusResponse};

/// Publish / poll operations the readiness protocol and detection poller
/// depend on.
///
/// Both operations are best-effort: failures are logged by the
/// implementation and never surface to the caller. A failed poll is
/// indistinguishable from "no message yet".
#[async_trait]
pub trait Broker: Send + Sync + 'static {
    /// Publish `message` on `topic`, fire-and-forget.
    async fn publish(&self, topic: &str, message: &str);

    /// Last message seen on `topic`, if any.
    async fn poll_last_message(&self, topic: &str) -> Option<Message>;
}

/// [`Broker`] implementation backed by the HTTP gateway.
pub struct BrokerClient {
    api: Arc<ApiClient>,
    log: Arc<ActivityLog>,
}

impl BrokerClient {
    pub fn new(api: Arc<ApiClient>, log: Arc<ActivityLog>) -> Self {
        Self { api, log }
    }

    pub fn activity_log(&self) -> &Arc<ActivityLog> {
        &self.log
    }

    /// Broker connection flag reported by the gateway.
    ///
    /// Returns `None` when the gateway could not be asked, so callers keep
    /// whatever they displayed before.
    pub async fn poll_connectivity_status(&self) -> Option<bool> {
        match self
            .api
            .get_json::<StatusResponse>(endpoints::MQTT_STATUS)
            .await
        {
            Ok(response) => Some(response.data.connected),
            Err(e) => {
                tracing::debug!(error = %e, "Broker status poll failed");
                None
            }
        }
    }

    /// Publish and report the gateway's verdict instead of swallowing it.
    pub async fn try_publish(&self, topic: &str, message: &str) -> Result<(), ClientError> {
        self.log.record(Direction::Send, topic, message);
        tracing::info!(topic, message, "Publishing broker message");

        let response: PublishResponse = self
            .api
            .post_json(endpoints::MQTT_PUBLISH, &PublishRequest { topic, message })
            .await?;

        match response.status.as_deref() {
            Some("success") => Ok(()),
            other => Err(ClientError::Rejected(
                response
                    .message
                    .map(|m| match m {
                        serde_json::Value::String(s) => s,
                        value => value.to_string(),
                    })
                    .unwrap_or_else(|| format!("status {:?}", other.unwrap_or("missing"))),
            )),
        }
    }
}

#[async_trait]
impl Broker for BrokerClient {
    async fn publish(&self, topic: &str, message: &str) {
        if let Err(e) = self.try_publish(topic, message).await {
            tracing::warn!(topic, error = %e, "Broker publish failed");
        }
    }

    async fn poll_last_message(&self, topic: &str) -> Option<Message> {
        let response: LastMessageResponse = match self
            .api
            .get_json_with_query(endpoints::MQTT_MESSAGES, &[("topic", topic)])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(topic, error = %e, "Broker message poll failed");
                return None;
            }
        };

        let message = response.message.filter(|m| !m.is_empty())?;
        self.log.record(Direction::Recv, topic, &message.as_text());
        tracing::debug!(topic, message = %message.as_text(), "Received broker message");
        Some(message)
    }
}

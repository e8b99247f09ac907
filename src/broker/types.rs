//! Broker gateway payloads.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::borrow::Cow;

/// Last message seen on a topic. The gateway returns either the raw text or,
/// when the payload parsed as JSON, the structured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    Structured(serde_json::Value),
}

impl Message {
    /// Text form of the message; structured payloads become their JSON text.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Message::Text(text) => Cow::Borrowed(text),
            Message::Structured(value) => Cow::Owned(value.to_string()),
        }
    }

    /// Empty text and JSON null count as "no message yet".
    pub fn is_empty(&self) -> bool {
        match self {
            Message::Text(text) => text.is_empty(),
            Message::Structured(value) => value.is_null(),
        }
    }
}

/// Command sent on a conveyor's command feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask the conveyor to report READY
    Ping,
    /// Run a physical action for a duration
    Action { action_id: u32, duration_ms: u64 },
}

impl Command {
    /// JSON text published as the gateway `message` field.
    pub fn to_message(&self) -> serde_json::Result<String> {
        let value = match self {
            Command::Ping => json!({ "action": "PING" }),
            Command::Action {
                action_id,
                duration_ms,
            } => json!({ "action": action_id, "duration_ms": duration_ms }),
        };
        serde_json::to_string(&value)
    }
}

/// Body of `POST /api/mqtt/publish`.
#[derive(Debug, Serialize)]
pub(crate) struct PublishRequest<'a> {
    pub topic: &'a str,
    pub message: &'a str,
}

/// Response of `POST /api/mqtt/publish`.
#[derive(Debug, Deserialize)]
pub(crate) struct PublishResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

/// Response of `GET /api/mqtt/messages`.
#[derive(Debug, Deserialize)]
pub(crate) struct LastMessageResponse {
    #[serde(default)]
    pub message: Option<Message>,
}

/// Response of `GET /api/mqtt/status`.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub data: StatusData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusData {
    pub connected: bool,
}

//! Readiness status and its guarded transitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Displayed readiness of a conveyor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessStatus {
    /// Never pinged, or cleared
    #[default]
    Idle,
    /// PING sent, waiting for the conveyor
    Pinging,
    /// Conveyor answered READY
    Ready,
    /// Conveyor reported a finished action; still waiting for READY
    Done,
    /// No READY before the deadline
    Timeout,
    /// The PING could not be sent at all
    Error,
}

impl ReadinessStatus {
    /// READY, TIMEOUT and ERROR end a session; nothing moves out of them.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReadinessStatus::Ready | ReadinessStatus::Timeout | ReadinessStatus::Error
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadinessStatus::Idle => "idle",
            ReadinessStatus::Pinging => "PING...",
            ReadinessStatus::Ready => "READY",
            ReadinessStatus::Done => "DONE",
            ReadinessStatus::Timeout => "TIMEOUT",
            ReadinessStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for ReadinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a status-feed message says about the conveyor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSignal {
    Ready,
    Done,
    Other,
}

/// Substring match on the message text. READY wins over DONE.
pub fn classify_status_message(text: &str) -> StatusSignal {
    if text.contains("READY") {
        StatusSignal::Ready
    } else if text.contains("DONE") {
        StatusSignal::Done
    } else {
        StatusSignal::Other
    }
}

/// Status published on a conveyor's watch channel, tagged with the session
/// that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConveyorStatus {
    /// Session allowed to write the status, `None` when idle
    pub session: Option<Uuid>,
    pub status: ReadinessStatus,
}

impl ConveyorStatus {
    pub fn pinging(session: Uuid) -> Self {
        Self {
            session: Some(session),
            status: ReadinessStatus::Pinging,
        }
    }

    /// Move to `next` on behalf of `session`.
    ///
    /// Rejected when another session owns the status, the current status is
    /// terminal, or nothing would change. Returns whether the status changed.
    pub fn apply(&mut self, session: Uuid, next: ReadinessStatus) -> bool {
        if self.session != Some(session) || self.status.is_terminal() || self.status == next {
            return false;
        }
        self.status = next;
        true
    }
}

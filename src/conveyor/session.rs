//! A single PING / READY handshake.

use super::state::{classify_status_message, ConveyorStatus, ReadinessStatus, StatusSignal};
use crate::broker::Broker;
use crate::config::ReadinessConfig;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Registry entry for the session currently allowed to run for a conveyor.
#[derive(Debug)]
pub(super) struct ActiveSession {
    pub id: Uuid,
    pub cancel: CancellationToken,
    pub started_at: Instant,
}

/// Everything a spawned session needs; owned by its task.
pub(super) struct Session {
    pub id: Uuid,
    pub conveyor: String,
    pub command_topic: String,
    pub status_topic: String,
    /// Encoded PING, `None` when encoding failed
    pub payload: Option<Arc<str>>,
    pub broker: Arc<dyn Broker>,
    pub config: ReadinessConfig,
    pub status: Arc<watch::Sender<ConveyorStatus>>,
    pub cancel: CancellationToken,
    pub sessions: Arc<DashMap<String, ActiveSession>>,
}

impl Session {
    /// Run the handshake to completion or cancellation, then deregister.
    pub async fn run(self) {
        let outcome = self.drive().await;

        self.sessions
            .remove_if(&self.conveyor, |_, active| active.id == self.id);

        match outcome {
            Some(status) => {
                metrics::counter!("cellctl_readiness_outcomes_total",
                    "outcome" => status.label()
                )
                .increment(1);
                tracing::info!(
                    conveyor = %self.conveyor,
                    session_id = %self.id,
                    status = %status,
                    "Readiness session finished"
                );
            }
            None => {
                tracing::debug!(
                    conveyor = %self.conveyor,
                    session_id = %self.id,
                    "Readiness session cancelled"
                );
            }
        }
    }

    /// Returns the terminal status reached, or `None` when cancelled.
    async fn drive(&self) -> Option<ReadinessStatus> {
        let Some(payload) = self.payload.as_deref() else {
            tracing::error!(conveyor = %self.conveyor, "No PING payload to publish");
            self.transition(ReadinessStatus::Error);
            return Some(ReadinessStatus::Error);
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            _ = self.broker.publish(&self.command_topic, payload) => {}
        }

        let deadline = tokio::time::sleep(self.config.timeout());
        tokio::pin!(deadline);

        let period = self.config.poll_interval();
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                _ = &mut deadline => return Some(self.time_out()),
                _ = ticker.tick() => {}
            }

            let message = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                _ = &mut deadline => return Some(self.time_out()),
                message = self.broker.poll_last_message(&self.status_topic) => message,
            };

            let Some(message) = message else {
                continue;
            };

            match classify_status_message(&message.as_text()) {
                StatusSignal::Ready => {
                    self.transition(ReadinessStatus::Ready);
                    return Some(ReadinessStatus::Ready);
                }
                StatusSignal::Done => self.transition(ReadinessStatus::Done),
                StatusSignal::Other => {}
            }
        }
    }

    fn time_out(&self) -> ReadinessStatus {
        tracing::warn!(
            conveyor = %self.conveyor,
            timeout_ms = self.config.timeout_ms,
            "Conveyor did not report READY in time"
        );
        self.transition(ReadinessStatus::Timeout);
        ReadinessStatus::Timeout
    }

    fn transition(&self, next: ReadinessStatus) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.status.send_if_modified(|current| current.apply(self.id, next));
    }
}

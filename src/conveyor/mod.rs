//! Conveyor readiness protocol.
//!
//! Pinging a conveyor publishes `{"action":"PING"}` on its command feed and
//! polls its status feed until the conveyor answers READY or the deadline
//! passes. A DONE report along the way is shown but does not end the wait.
//!
//! Each conveyor has at most one live session. Starting a new ping cancels
//! the previous session's timeout and polling together, since both run in a
//! single task driven by one cancellation token.

mod session;
mod state;


pub use state::{classify_status_message, ConveyorStatus, ReadinessStatus, StatusSignal};

use crate::broker::{Broker, Command};
use crate::config::{BrokerConfig, ReadinessConfig};
use crate::topic::{feed_topic, Feed};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use session::{ActiveSession, Session};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

/// Owns the per-conveyor readiness sessions and their status channels.
pub struct ReadinessMonitor {
    broker: Arc<dyn Broker>,
    broker_config: BrokerConfig,
    config: ReadinessConfig,
    /// PING message shared by every session
    ping_payload: Option<Arc<str>>,
    /// Live session per conveyor id
    sessions: Arc<DashMap<String, ActiveSession>>,
    /// Status channel per conveyor id, kept until cleared
    channels: DashMap<String, Arc<watch::Sender<ConveyorStatus>>>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl ReadinessMonitor {
    pub fn new(
        broker: Arc<dyn Broker>,
        broker_config: BrokerConfig,
        config: ReadinessConfig,
    ) -> Self {
        let ping_payload = match Command::Ping.to_message() {
            Ok(payload) => Some(Arc::from(payload)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode PING");
                None
            }
        };

        Self {
            broker,
            broker_config,
            config,
            ping_payload,
            sessions: Arc::new(DashMap::new()),
            channels: DashMap::new(),
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Start a readiness handshake for `conveyor_id`, replacing any session
    /// already running for it.
    ///
    /// Must be called from within a Tokio runtime. The returned receiver
    /// observes the conveyor's status, starting at PINGING.
    pub fn ping(&self, conveyor_id: &str) -> watch::Receiver<ConveyorStatus> {
        let channel = self.channel(conveyor_id);

        if self.shutdown.is_cancelled() {
            tracing::warn!(conveyor = conveyor_id, "Readiness monitor is shut down, ignoring ping");
            return channel.subscribe();
        }

        let id = Uuid::new_v4();
        let cancel = self.shutdown.child_token();
        let active = ActiveSession {
            id,
            cancel: cancel.clone(),
            started_at: Instant::now(),
        };

        // The entry guard serializes concurrent pings for the same conveyor,
        // so the status owner always matches the registered session.
        match self.sessions.entry(conveyor_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let previous = entry.insert(active);
                previous.cancel.cancel();
                tracing::debug!(
                    conveyor = conveyor_id,
                    previous_session = %previous.id,
                    "Replaced running readiness session"
                );
                channel.send_replace(ConveyorStatus::pinging(id));
            }
            Entry::Vacant(entry) => {
                entry.insert(active);
                channel.send_replace(ConveyorStatus::pinging(id));
            }
        }

        tracing::info!(conveyor = conveyor_id, session_id = %id, "Pinging conveyor");

        let session = Session {
            id,
            conveyor: conveyor_id.to_string(),
            command_topic: feed_topic(&self.broker_config, conveyor_id, Feed::Command),
            status_topic: feed_topic(&self.broker_config, conveyor_id, Feed::Status),
            payload: self.ping_payload.clone(),
            broker: Arc::clone(&self.broker),
            config: self.config.clone(),
            status: Arc::clone(&channel),
            cancel,
            sessions: Arc::clone(&self.sessions),
        };
        self.tracker.spawn(session.run());

        channel.subscribe()
    }

    /// Current status of a conveyor (`Idle` if never pinged).
    pub fn status(&self, conveyor_id: &str) -> ReadinessStatus {
        self.channels
            .get(conveyor_id)
            .map(|channel| channel.borrow().status)
            .unwrap_or_default()
    }

    /// Status of every known conveyor, sorted by id.
    pub fn statuses(&self) -> Vec<(String, ReadinessStatus)> {
        let mut statuses: Vec<_> = self
            .channels
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().borrow().status))
            .collect();
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        statuses
    }

    /// Watch a conveyor's status without pinging it.
    pub fn subscribe(&self, conveyor_id: &str) -> watch::Receiver<ConveyorStatus> {
        self.channel(conveyor_id).subscribe()
    }

    /// Whether a session is still polling for this conveyor.
    pub fn is_active(&self, conveyor_id: &str) -> bool {
        self.sessions.contains_key(conveyor_id)
    }

    /// Number of live sessions across all conveyors.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// How long the live session for a conveyor has been running.
    pub fn session_age(&self, conveyor_id: &str) -> Option<std::time::Duration> {
        self.sessions
            .get(conveyor_id)
            .map(|active| active.started_at.elapsed())
    }

    /// Stop polling for a conveyor, keeping its last status.
    pub fn cancel(&self, conveyor_id: &str) -> bool {
        match self.sessions.remove(conveyor_id) {
            Some((_, active)) => {
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Stop polling and forget everything about a conveyor.
    pub fn clear(&self, conveyor_id: &str) {
        self.cancel(conveyor_id);
        if let Some((_, channel)) = self.channels.remove(conveyor_id) {
            channel.send_replace(ConveyorStatus::default());
        }
    }

    /// Cancel every session and wait for their tasks to exit.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.sessions.clear();
        self.tracker.close();
        self.tracker.wait().await;
        tracing::debug!("Readiness monitor stopped");
    }

    #[cfg(test)]
    fn without_ping_payload(mut self) -> Self {
        self.ping_payload = None;
        self
    }

    fn channel(&self, conveyor_id: &str) -> Arc<watch::Sender<ConveyorStatus>> {
        self.channels
            .entry(conveyor_id.to_string())
            .or_insert_with(|| Arc::new(watch::channel(ConveyorStatus::default()).0))
            .clone()
    }
}

/// Wait until the observed session reaches READY, TIMEOUT or ERROR.
///
/// Returns the last seen status if the channel closes first (conveyor
/// cleared) or the status is reset to idle.
pub async fn wait_for_outcome(mut rx: watch::Receiver<ConveyorStatus>) -> ReadinessStatus {
    let outcome = rx
        .wait_for(|s| s.status.is_terminal() || s.status == ReadinessStatus::Idle)
        .await
        .map(|s| s.status);

    match outcome {
        Ok(status) => status,
        Err(_) => rx.borrow().status,
    }
}

//! Detection polling and color-driven action dispatch.
//!
//! Each tick fetches the backend's current detections, re-renders the list
//! and, for every detection carrying an action, publishes the action on the
//! selected conveyor's command feed unless that action is still cooling
//! down.

mod cooldown;
mod types;

pub use cooldown::{CooldownKey, CooldownRegistry};
pub use types::{fallback_action, render, Detection, DetectionView};

use crate::broker::{Broker, Command};
use crate::camera::CameraSession;
use crate::client::{endpoints, ApiClient, ClientError};
use crate::config::{BrokerConfig, DispatchConfig};
use crate::topic::{feed_topic, Feed};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use types::DetectionsResponse;

/// What a single poll tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Camera not running, nothing fetched
    CameraStopped,
    /// Detections could not be fetched; the previous list is kept
    FetchFailed,
    Processed(TickSummary),
}

/// Counts for a processed tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub detections: usize,
    pub dispatched: usize,
    pub suppressed: usize,
    /// Detections without a usable action
    pub skipped: usize,
}

pub struct DetectionPoller {
    api: Arc<ApiClient>,
    broker: Arc<dyn Broker>,
    camera: Arc<CameraSession>,
    broker_config: BrokerConfig,
    dispatch: DispatchConfig,
    cooldowns: CooldownRegistry,
    selected: RwLock<Option<String>>,
    rendered: RwLock<Vec<DetectionView>>,
}

impl DetectionPoller {
    pub fn new(
        api: Arc<ApiClient>,
        broker: Arc<dyn Broker>,
        camera: Arc<CameraSession>,
        broker_config: BrokerConfig,
        dispatch: DispatchConfig,
    ) -> Self {
        let grace = Duration::from_millis(dispatch.grace_ms);
        Self {
            api,
            broker,
            camera,
            broker_config,
            dispatch,
            cooldowns: CooldownRegistry::new(grace),
            selected: RwLock::new(None),
            rendered: RwLock::new(Vec::new()),
        }
    }

    /// Conveyor that receives dispatched actions.
    ///
    /// Switching to a different conveyor drops the old conveyor's cooldowns.
    pub fn select_conveyor(&self, conveyor_id: Option<&str>) {
        let next = conveyor_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let mut selected = self.selected.write().unwrap_or_else(|e| e.into_inner());
        if *selected == next {
            return;
        }
        if let Some(previous) = selected.as_deref() {
            let cleared = self.cooldowns.clear_conveyor(previous);
            tracing::debug!(conveyor = previous, cleared, "Cleared cooldowns of deselected conveyor");
        }
        tracing::info!(conveyor = ?next, "Selected conveyor");
        *selected = next;
    }

    pub fn selected_conveyor(&self) -> Option<String> {
        self.selected
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn cooldowns(&self) -> &CooldownRegistry {
        &self.cooldowns
    }

    /// Detections rendered by the last processed tick.
    pub fn detections(&self) -> Vec<DetectionView> {
        self.rendered
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Forget the rendered list (camera stopped).
    pub fn reset(&self) {
        self.rendered
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Fetch the current detections without dispatching anything.
    ///
    /// A response whose `status` is present and not `"success"` is
    /// reported as [`ClientError::Rejected`].
    pub async fn fetch(&self) -> Result<Vec<Detection>, ClientError> {
        let response: DetectionsResponse = self.api.get_json(endpoints::CAMERA_DETECTIONS).await?;

        match response.status.as_deref() {
            None | Some("success") => Ok(response.detections),
            Some(other) => Err(ClientError::Rejected(format!("detections status {}", other))),
        }
    }

    /// One poll cycle: gate on the camera, fetch, render, dispatch.
    pub async fn tick(&self) -> TickOutcome {
        if !self.camera.is_running() {
            return TickOutcome::CameraStopped;
        }

        let detections = match self.fetch().await {
            Ok(detections) => detections,
            Err(e) => {
                tracing::debug!(error = %e, "Detection fetch failed");
                return TickOutcome::FetchFailed;
            }
        };

        // The camera may have stopped while the fetch was in flight
        if !self.camera.is_running() {
            return TickOutcome::CameraStopped;
        }

        TickOutcome::Processed(self.process(detections, Instant::now()).await)
    }

    /// Render `detections` and dispatch their actions as of `now`.
    pub async fn process(&self, detections: Vec<Detection>, now: Instant) -> TickSummary {
        let detections: Vec<Detection> = if self.dispatch.fallback_colors {
            detections.into_iter().map(Detection::with_fallback).collect()
        } else {
            detections
        };

        *self.rendered.write().unwrap_or_else(|e| e.into_inner()) = render(&detections);

        let mut summary = TickSummary {
            detections: detections.len(),
            ..Default::default()
        };

        let Some(conveyor) = self.selected_conveyor() else {
            return summary;
        };
        let topic = feed_topic(&self.broker_config, &conveyor, Feed::Command);

        for detection in &detections {
            let Some((action_id, duration_ms)) = detection.action() else {
                summary.skipped += 1;
                continue;
            };

            if !self
                .cooldowns
                .try_acquire(&conveyor, action_id, duration_ms, now)
            {
                summary.suppressed += 1;
                metrics::counter!("cellctl_actions_suppressed_total", "conveyor" => conveyor.clone())
                    .increment(1);
                tracing::trace!(conveyor = %conveyor, action_id, "Action cooling down");
                continue;
            }

            let message = match (Command::Action {
                action_id,
                duration_ms,
            })
            .to_message()
            {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(action_id, error = %e, "Failed to encode action command");
                    continue;
                }
            };

            tracing::info!(
                conveyor = %conveyor,
                color = %detection.name,
                action_id,
                duration_ms,
                "Dispatching action"
            );
            self.broker.publish(&topic, &message).await;
            summary.dispatched += 1;
            metrics::counter!("cellctl_actions_dispatched_total", "conveyor" => conveyor.clone())
                .increment(1);
        }

        summary
    }
}

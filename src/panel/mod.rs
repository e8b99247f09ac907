//! Page-level scheduler.
//!
//! A [`Panel`] wires every component to one backend and runs the two
//! background loops: broker connectivity (every 5 s by default) and
//! detection polling (every 1 s). Loops can be paused and resumed, which is
//! how a client that goes out of view stops hammering the backend.

use crate::broker::{ActivityLog, Broker, BrokerClient, LogEntry};
use crate::camera::{CameraInfo, CameraSession, CameraSource, ViewTransform};
use crate::client::{ApiClient, ClientError};
use crate::colors::{ColorClient, ColorRule, ColorTable, SaveOutcome};
use crate::config::PanelConfig;
use crate::conveyor::{ConveyorStatus, ReadinessMonitor, ReadinessStatus};
use crate::detection::{DetectionPoller, DetectionView, TickOutcome};
use crate::indicator::Indicator;
use serde::Serialize;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Payload published on the emergency topic.
pub const EMERGENCY_STOP_MESSAGE: &str = "STOP";

/// What [`Panel::init`] managed to set up.
#[derive(Debug, Clone)]
pub struct InitReport {
    /// Camera start result; detection stays gated off on failure
    pub camera: Result<(), ClientError>,
    pub cameras: usize,
    /// `None` when the gateway could not be reached
    pub broker_connected: Option<bool>,
    pub color_rules: usize,
}

/// Everything an operator view shows at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub broker: Indicator,
    pub camera: Indicator,
    pub stream_url: Option<String>,
    pub view: ViewTransform,
    pub selected_conveyor: Option<String>,
    pub conveyors: Vec<(String, ReadinessStatus)>,
    pub detections: Vec<DetectionView>,
    pub activity: Vec<LogEntry>,
    pub polling: bool,
}

struct PollingLoops {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

pub struct Panel {
    config: PanelConfig,
    broker: Arc<BrokerClient>,
    camera: Arc<CameraSession>,
    detection: Arc<DetectionPoller>,
    readiness: ReadinessMonitor,
    colors: ColorClient,
    color_table: Mutex<ColorTable>,
    broker_indicator: Arc<RwLock<Indicator>>,
    cameras: RwLock<Vec<CameraInfo>>,
    loops: Mutex<Option<PollingLoops>>,
}

impl Panel {
    pub fn new(config: PanelConfig) -> Result<Self, ClientError> {
        let api = Arc::new(ApiClient::new(&config.backend)?);
        let log = Arc::new(ActivityLog::new(config.activity_log.max_entries));
        let broker = Arc::new(BrokerClient::new(Arc::clone(&api), log));
        let camera = Arc::new(CameraSession::new(Arc::clone(&api)));

        let shared_broker: Arc<dyn Broker> = broker.clone();
        let detection = Arc::new(DetectionPoller::new(
            Arc::clone(&api),
            Arc::clone(&shared_broker),
            Arc::clone(&camera),
            config.broker.clone(),
            config.dispatch.clone(),
        ));
        let readiness = ReadinessMonitor::new(
            shared_broker,
            config.broker.clone(),
            config.readiness.clone(),
        );

        Ok(Self {
            colors: ColorClient::new(api),
            broker,
            camera,
            detection,
            readiness,
            color_table: Mutex::new(ColorTable::default()),
            broker_indicator: Arc::new(RwLock::new(Indicator::broker_unknown())),
            cameras: RwLock::new(Vec::new()),
            loops: Mutex::new(None),
            config,
        })
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn broker(&self) -> &BrokerClient {
        &self.broker
    }

    pub fn camera(&self) -> &CameraSession {
        &self.camera
    }

    pub fn detection(&self) -> &DetectionPoller {
        &self.detection
    }

    pub fn readiness(&self) -> &ReadinessMonitor {
        &self.readiness
    }

    pub fn activity_log(&self) -> &Arc<ActivityLog> {
        self.broker.activity_log()
    }

    /// Bring the panel up: start the configured camera (when enabled), list
    /// cameras, check the broker once and load the color rules.
    ///
    /// A camera failure is reported, not returned: the panel stays usable
    /// with detection polling gated off.
    pub async fn init(&self) -> InitReport {
        let camera = if self.config.camera.auto_start {
            self.start_camera(&CameraSource::from_config(&self.config.camera))
                .await
        } else {
            Ok(())
        };

        let cameras = self.camera.list_cameras().await;
        let camera_count = cameras.len();
        *self.cameras.write().unwrap_or_else(|e| e.into_inner()) = cameras;

        let broker_connected = self.refresh_broker_status().await;
        let color_rules = self.reload_colors().await;

        tracing::info!(
            camera_running = self.camera.is_running(),
            cameras = camera_count,
            broker_connected = ?broker_connected,
            color_rules,
            "Panel initialized"
        );

        InitReport {
            camera,
            cameras: camera_count,
            broker_connected,
            color_rules,
        }
    }

    /// Poll broker connectivity once and update the lamp.
    pub async fn refresh_broker_status(&self) -> Option<bool> {
        refresh_indicator(&self.broker, &self.broker_indicator).await
    }

    pub fn broker_indicator(&self) -> Indicator {
        self.broker_indicator
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Start the connectivity and detection loops. Returns `false` if they
    /// were already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_polling(&self) -> bool {
        let mut loops = self.loops.lock().unwrap_or_else(|e| e.into_inner());
        if loops.is_some() {
            return false;
        }

        let cancel = CancellationToken::new();
        let status_every = Duration::from_millis(self.config.polling.status_interval_ms);
        let detection_every = Duration::from_millis(self.config.polling.detection_interval_ms);

        let broker = Arc::clone(&self.broker);
        let indicator = Arc::clone(&self.broker_indicator);
        let status_loop = spawn_loop("broker status", status_every, cancel.clone(), move || {
            let broker = Arc::clone(&broker);
            let indicator = Arc::clone(&indicator);
            async move {
                refresh_indicator(&broker, &indicator).await;
            }
        });

        let detection = Arc::clone(&self.detection);
        let detection_loop = spawn_loop("detection", detection_every, cancel.clone(), move || {
            let detection = Arc::clone(&detection);
            async move {
                if let TickOutcome::Processed(summary) = detection.tick().await {
                    tracing::trace!(
                        detections = summary.detections,
                        dispatched = summary.dispatched,
                        suppressed = summary.suppressed,
                        "Detection tick"
                    );
                }
            }
        });

        *loops = Some(PollingLoops {
            cancel,
            handles: vec![status_loop, detection_loop],
        });
        true
    }

    /// Stop both loops and wait for them to exit. Returns `false` if they
    /// were not running.
    pub async fn stop_polling(&self) -> bool {
        let loops = self
            .loops
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let Some(loops) = loops else {
            return false;
        };
        loops.cancel.cancel();
        for handle in loops.handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Polling loop ended abnormally");
            }
        }
        true
    }

    pub fn is_polling(&self) -> bool {
        self.loops
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Conveyor that receives dispatched actions; `None` disables dispatch.
    pub fn select_conveyor(&self, conveyor_id: Option<&str>) {
        self.detection.select_conveyor(conveyor_id);
    }

    /// Start a readiness handshake. See [`ReadinessMonitor::ping`].
    pub fn ping(&self, conveyor_id: &str) -> watch::Receiver<ConveyorStatus> {
        self.readiness.ping(conveyor_id)
    }

    /// Publish `STOP` on the emergency topic.
    pub async fn emergency_stop(&self) -> Result<(), ClientError> {
        let topic = &self.config.broker.emergency_topic;
        tracing::warn!(topic = %topic, "Emergency stop");
        self.broker.try_publish(topic, EMERGENCY_STOP_MESSAGE).await
    }

    pub async fn start_camera(&self, source: &CameraSource) -> Result<(), ClientError> {
        self.camera.start(source).await
    }

    /// Stop the camera and clear the detection list.
    pub async fn stop_camera(&self) {
        self.camera.stop().await;
        self.detection.reset();
    }

    pub fn cameras(&self) -> Vec<CameraInfo> {
        self.cameras
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Reload the staging table from the backend; returns the row count.
    pub async fn reload_colors(&self) -> usize {
        let rules = self.colors.load().await;
        let count = rules.len();
        self.color_table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(rules);
        count
    }

    /// Reload the staging table, failing instead of staging an empty set.
    ///
    /// Use before editing rules that will be saved back: a failed load
    /// leaves the table untouched.
    pub async fn reload_colors_strict(&self) -> Result<usize, ClientError> {
        let rules = self.colors.try_load().await?;
        let count = rules.len();
        self.color_table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(rules);
        Ok(count)
    }

    pub fn color_table(&self) -> ColorTable {
        self.color_table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Apply row operations to the staging table.
    pub fn edit_colors<R>(&self, change: impl FnOnce(&mut ColorTable) -> R) -> R {
        let mut table = self.color_table.lock().unwrap_or_else(|e| e.into_inner());
        change(&mut table)
    }

    /// Send the staging table to the backend as the full rule set.
    pub async fn save_colors(&self) -> SaveOutcome {
        let rules: Vec<ColorRule> = self.color_table().rows().to_vec();
        self.colors.save(&rules).await
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            broker: self.broker_indicator(),
            camera: self.camera.indicator(),
            stream_url: self.camera.stream_url(),
            view: self.camera.view(),
            selected_conveyor: self.detection.selected_conveyor(),
            conveyors: self.readiness.statuses(),
            detections: self.detection.detections(),
            activity: self.activity_log().entries(),
            polling: self.is_polling(),
        }
    }

    /// Stop the loops and every readiness session.
    pub async fn shutdown(&self) {
        self.stop_polling().await;
        self.readiness.shutdown().await;
        tracing::info!("Panel shut down");
    }
}

async fn refresh_indicator(broker: &BrokerClient, indicator: &RwLock<Indicator>) -> Option<bool> {
    let connected = broker.poll_connectivity_status().await;
    if let Some(connected) = connected {
        let next = Indicator::broker(connected);
        let mut current = indicator.write().unwrap_or_else(|e| e.into_inner());
        if *current != next {
            tracing::info!(status = %next, "Broker connectivity changed");
            *current = next;
        }
    }
    connected
}

fn spawn_loop<F, Fut>(
    name: &'static str,
    every: Duration,
    cancel: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::debug!(loop_name = name, interval_ms = every.as_millis() as u64, "Polling loop started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(loop_name = name, "Polling loop stopped");
                    break;
                }
                _ = interval.tick() => {
                    tick().await;
                }
            }
        }
    })
}

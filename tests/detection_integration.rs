//! Integration tests for detection polling and action dispatch.

mod common;

use cellctl::broker::{ActivityLog, Broker, BrokerClient};
use cellctl::camera::{CameraSession, CameraSource};
use cellctl::config::{BrokerConfig, DispatchConfig};
use cellctl::detection::{DetectionPoller, TickOutcome, TickSummary};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup(server: &MockServer, start_camera: bool) -> DetectionPoller {
    common::mount_publish_ok(server).await;
    common::mount_camera_start_ok(server).await;

    let api = common::api(server);
    let broker: Arc<dyn Broker> = Arc::new(BrokerClient::new(
        Arc::clone(&api),
        Arc::new(ActivityLog::new(100)),
    ));
    let camera = Arc::new(CameraSession::new(Arc::clone(&api)));
    if start_camera {
        camera.start(&CameraSource::Usb(0)).await.unwrap();
    }

    DetectionPoller::new(
        api,
        broker,
        camera,
        BrokerConfig::default(),
        DispatchConfig::default(),
    )
}

#[tokio::test]
async fn test_blue_detection_dispatches_once_within_cooldown() {
    let server = MockServer::start().await;
    common::mount_detections(
        &server,
        json!([{"name": "blue", "action_id": 1, "duration_ms": 4000, "bgr": [255, 0, 0]}]),
    )
    .await;
    let poller = setup(&server, true).await;
    poller.select_conveyor(Some("0_SmartConvey2025"));

    let first = poller.tick().await;
    let second = poller.tick().await;

    assert_eq!(
        first,
        TickOutcome::Processed(TickSummary {
            detections: 1,
            dispatched: 1,
            suppressed: 0,
            skipped: 0,
        })
    );
    assert!(matches!(second, TickOutcome::Processed(s) if s.suppressed == 1));

    let published = common::published_messages(&server).await;
    assert_eq!(
        published,
        vec![(
            "0_SmartConvey2025/feeds/V1".to_string(),
            r#"{"action":1,"duration_ms":4000}"#.to_string()
        )]
    );

    let views = poller.detections();
    assert_eq!(views[0].name, "blue");
    assert_eq!(views[0].swatch.as_deref(), Some("rgb(0,0,255)"));
}

#[tokio::test]
async fn test_null_action_renders_without_publish() {
    let server = MockServer::start().await;
    common::mount_detections(
        &server,
        json!([{"name": "blue", "action_id": null, "duration_ms": null}]),
    )
    .await;
    let poller = setup(&server, true).await;
    poller.select_conveyor(Some("0_SmartConvey2025"));

    let outcome = poller.tick().await;

    assert!(matches!(outcome, TickOutcome::Processed(s) if s.skipped == 1 && s.dispatched == 0));
    assert_eq!(poller.detections().len(), 1);
    assert!(common::published_messages(&server).await.is_empty());
}

#[tokio::test]
async fn test_camera_stopped_skips_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/camera/detections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detections": []})))
        .expect(0)
        .mount(&server)
        .await;
    let poller = setup(&server, false).await;
    poller.select_conveyor(Some("0_SmartConvey2025"));

    assert_eq!(poller.tick().await, TickOutcome::CameraStopped);
}

#[tokio::test]
async fn test_camera_stopped_during_fetch_discards_result() {
    let server = MockServer::start().await;
    common::mount_publish_ok(&server).await;
    common::mount_camera_start_ok(&server).await;
    common::mount_camera_stop_ok(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/camera/detections"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "status": "success",
                    "detections": [{"name": "blue", "action_id": 1, "duration_ms": 4000}]
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let api = common::api(&server);
    let broker: Arc<dyn Broker> = Arc::new(BrokerClient::new(
        Arc::clone(&api),
        Arc::new(ActivityLog::new(100)),
    ));
    let camera = Arc::new(CameraSession::new(Arc::clone(&api)));
    camera.start(&CameraSource::Usb(0)).await.unwrap();
    let poller = DetectionPoller::new(
        api,
        broker,
        Arc::clone(&camera),
        BrokerConfig::default(),
        DispatchConfig::default(),
    );
    poller.select_conveyor(Some("0_SmartConvey2025"));

    let (outcome, _) = tokio::join!(poller.tick(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        camera.stop().await;
    });

    assert_eq!(outcome, TickOutcome::CameraStopped);
    assert!(poller.detections().is_empty());
    assert!(common::published_messages(&server).await.is_empty());
}

#[tokio::test]
async fn test_fetch_failure_keeps_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/camera/detections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "detections": [{"name": "red"}]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/camera/detections"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    let poller = setup(&server, true).await;

    assert!(matches!(poller.tick().await, TickOutcome::Processed(_)));
    assert_eq!(poller.tick().await, TickOutcome::FetchFailed);
    assert_eq!(poller.detections()[0].name, "red");
}

#[tokio::test]
async fn test_non_success_status_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/camera/detections"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "error", "detections": []})),
        )
        .mount(&server)
        .await;
    let poller = setup(&server, true).await;

    assert_eq!(poller.tick().await, TickOutcome::FetchFailed);
}

#[tokio::test]
async fn test_no_conveyor_selected_dispatches_nothing() {
    let server = MockServer::start().await;
    common::mount_detections(
        &server,
        json!([{"name": "green", "action_id": 2, "duration_ms": 6000}]),
    )
    .await;
    let poller = setup(&server, true).await;

    let outcome = poller.tick().await;

    assert!(matches!(outcome, TickOutcome::Processed(s) if s.detections == 1 && s.dispatched == 0));
    assert!(common::published_messages(&server).await.is_empty());
}

#[tokio::test]
async fn test_empty_detection_list() {
    let server = MockServer::start().await;
    common::mount_detections(&server, json!([])).await;
    let poller = setup(&server, true).await;
    poller.select_conveyor(Some("0_SmartConvey2025"));

    assert_eq!(
        poller.tick().await,
        TickOutcome::Processed(TickSummary::default())
    );
    assert!(poller.detections().is_empty());
}

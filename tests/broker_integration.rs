//! Integration tests for the broker gateway client.

mod common;

use cellctl::broker::{ActivityLog, Broker, BrokerClient, Direction, Message};
use cellctl::client::ClientError;
use cellctl::indicator::IndicatorColor;
use cellctl::panel::Panel;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn broker(server: &MockServer) -> BrokerClient {
    BrokerClient::new(common::api(server), Arc::new(ActivityLog::new(0)))
}

#[tokio::test]
async fn test_publish_posts_topic_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/mqtt/publish"))
        .and(body_json(json!({
            "topic": "0_SmartConvey2025/feeds/V1",
            "message": "{\"action\":\"PING\"}"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = broker(&server);
    client
        .publish("0_SmartConvey2025/feeds/V1", r#"{"action":"PING"}"#)
        .await;

    let entries = client.activity_log().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].direction, Direction::Send);
    assert!(entries[0]
        .to_string()
        .contains("→ SEND: 0_SmartConvey2025/feeds/V1 | {\"action\":\"PING\"}"));
}

#[tokio::test]
async fn test_publish_failure_is_swallowed_but_logged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/mqtt/publish"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = broker(&server);
    client.publish("emergency", "STOP").await;

    // SEND is logged before the request resolves
    assert_eq!(client.activity_log().len(), 1);
}

#[tokio::test]
async fn test_try_publish_reports_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/mqtt/publish"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "error", "message": "broker offline"})),
        )
        .mount(&server)
        .await;

    let result = broker(&server).try_publish("emergency", "STOP").await;
    assert_eq!(result, Err(ClientError::Rejected("broker offline".to_string())));
}

#[tokio::test]
async fn test_try_publish_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/mqtt/publish"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = broker(&server).try_publish("emergency", "STOP").await;
    assert_eq!(result, Err(ClientError::Http(503)));
}

#[tokio::test]
async fn test_poll_last_message_sends_topic_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mqtt/messages"))
        .and(query_param("topic", "0_SmartConvey2025/feeds/V2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "READY"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = broker(&server);
    let message = client
        .poll_last_message("0_SmartConvey2025/feeds/V2")
        .await;

    assert_eq!(message, Some(Message::Text("READY".to_string())));
    let entries = client.activity_log().entries();
    assert_eq!(entries[0].direction, Direction::Recv);
    assert!(entries[0]
        .to_string()
        .contains("← RECV: 0_SmartConvey2025/feeds/V2 | READY"));
}

#[tokio::test]
async fn test_poll_last_message_structured_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mqtt/messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": {"status": "DONE"}})),
        )
        .mount(&server)
        .await;

    let message = broker(&server).poll_last_message("c1/feeds/V2").await.unwrap();
    assert!(message.as_text().contains("DONE"));
}

#[tokio::test]
async fn test_poll_last_message_null_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mqtt/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": null})))
        .mount(&server)
        .await;

    let client = broker(&server);
    assert_eq!(client.poll_last_message("c1/feeds/V2").await, None);
    assert!(client.activity_log().is_empty());
}

#[tokio::test]
async fn test_poll_last_message_errors_are_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mqtt/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = broker(&server);
    assert_eq!(client.poll_last_message("c1/feeds/V2").await, None);

    let unreachable = BrokerClient::new(
        Arc::new(
            cellctl::client::ApiClient::new(&cellctl::config::BackendConfig {
                base_url: "http://127.0.0.1:1".to_string(),
                timeout_ms: 500,
            })
            .unwrap(),
        ),
        Arc::new(ActivityLog::default()),
    );
    assert_eq!(unreachable.poll_last_message("c1/feeds/V2").await, None);
}

#[tokio::test]
async fn test_connectivity_status() {
    let server = MockServer::start().await;
    common::mount_broker_status(&server, true).await;

    assert_eq!(broker(&server).poll_connectivity_status().await, Some(true));
}

#[tokio::test]
async fn test_connectivity_status_malformed_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mqtt/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    assert_eq!(broker(&server).poll_connectivity_status().await, None);
}

#[tokio::test]
async fn test_offline_broker_turns_indicator_red() {
    let server = MockServer::start().await;
    common::mount_broker_status(&server, false).await;

    let panel = Panel::new(common::panel_config(&server)).unwrap();
    assert_eq!(panel.broker_indicator().color, IndicatorColor::Gray);

    assert_eq!(panel.refresh_broker_status().await, Some(false));
    let indicator = panel.broker_indicator();
    assert_eq!(indicator.label, "MQTT Offline");
    assert_eq!(indicator.color, IndicatorColor::Red);
}

#[tokio::test]
async fn test_status_failure_keeps_previous_indicator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/mqtt/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"connected": true}})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/mqtt/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let panel = Panel::new(common::panel_config(&server)).unwrap();
    assert_eq!(panel.refresh_broker_status().await, Some(true));
    assert_eq!(panel.refresh_broker_status().await, None);
    assert_eq!(panel.broker_indicator().label, "MQTT Online");
}

#[tokio::test]
async fn test_activity_log_bound_drops_oldest() {
    let server = MockServer::start().await;
    common::mount_publish_ok(&server).await;

    let client = BrokerClient::new(common::api(&server), Arc::new(ActivityLog::new(2)));
    for i in 0..3 {
        client.publish("t", &format!("m{}", i)).await;
    }

    let payloads: Vec<_> = client
        .activity_log()
        .entries()
        .into_iter()
        .map(|entry| entry.payload)
        .collect();
    assert_eq!(payloads, vec!["m2", "m1"]);
}

// Integration tests for `DashClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netwatch_api::models::{
    NotificationsPayload, ServiceKind, ServicePayload, ServiceStatus, Severity,
};
use netwatch_api::{DashClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DashClient) {
    let server = MockServer::start().await;
    let url = server.uri().parse().expect("mock server URI");
    let client = DashClient::with_client(reqwest::Client::new(), url);
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_metrics() {
    let (server, client) = setup().await;

    let body = json!({
        "cpu": 23.5,
        "memory": { "percent": 61.2 },
        "network": {
            "total": { "bytes_sent": 123_456, "bytes_recv": 654_321 },
            "interfaces": {
                "eth0": { "bytes_sent": 100_000, "bytes_recv": 600_000, "ip": "192.168.1.50" },
                "lo": { "bytes_sent": 23_456, "bytes_recv": 54_321, "ip": "N/A" }
            },
            "connections": [
                { "process": "firefox", "pid": 4242, "laddr": "192.168.1.50:51234",
                  "raddr": "142.250.1.1:443", "status": "ESTABLISHED" }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let metrics = client.get_metrics().await.unwrap();

    assert!((metrics.cpu - 23.5).abs() < f64::EPSILON);
    assert!((metrics.memory.percent - 61.2).abs() < f64::EPSILON);
    assert_eq!(metrics.network.total.bytes_sent, 123_456);

    let eth0 = &metrics.network.interfaces["eth0"];
    assert_eq!(eth0.address(), Some("192.168.1.50"));
    // The backend's "N/A" placeholder must not leak as an address.
    assert_eq!(metrics.network.interfaces["lo"].address(), None);

    assert_eq!(metrics.network.connections.len(), 1);
    assert_eq!(metrics.network.connections[0].process, "firefox");
    assert_eq!(metrics.network.connections[0].pid, 4242);
}

#[tokio::test]
async fn test_get_ping_ok_and_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok", "latency": 12.4, "target": "8.8.8.8"
        })))
        .mount(&server)
        .await;

    let ping = client.get_ping().await.unwrap();
    assert!(ping.is_ok());
    assert_eq!(ping.latency_ms(), Some(12.4));

    server.reset().await;

    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error", "latency": -1, "target": "8.8.8.8"
        })))
        .mount(&server)
        .await;

    let ping = client.get_ping().await.unwrap();
    assert!(!ping.is_ok());
    assert_eq!(ping.latency_ms(), None);
}

#[tokio::test]
async fn test_get_notifications_feed_shape() {
    let (server, client) = setup().await;

    let body = json!({
        "unread_count": 2,
        "list": [
            { "id": 7, "title": "Servicio Caído", "message": "web-1 no responde",
              "type": "danger", "read": false, "time": "10:32:01" },
            { "id": 6, "title": "CPU", "message": "high load", "type": "warning",
              "read": false, "time": "10:31:40" },
            { "id": 5, "title": "Info", "message": "scan done", "type": "info",
              "read": true, "time": "10:30:00" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let payload = client.get_notifications().await.unwrap();

    assert_eq!(payload.unread_count(), Some(2));
    assert_eq!(payload.list().len(), 3);
    assert_eq!(payload.list()[0].severity, Severity::Danger);
    assert!(payload.list()[2].read);
}

#[tokio::test]
async fn test_get_notifications_legacy_bare_array() {
    let (server, client) = setup().await;

    let body = json!([
        { "id": 3, "title": "t", "message": "m", "type": "info", "read": false,
          "time": "09:00:00" }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let payload = client.get_notifications().await.unwrap();

    assert!(matches!(payload, NotificationsPayload::Legacy(_)));
    assert_eq!(payload.unread_count(), None);
    assert_eq!(payload.list().len(), 1);
}

#[tokio::test]
async fn test_mark_notifications_read() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/notifications/mark_read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    client.mark_notifications_read().await.unwrap();
}

#[tokio::test]
async fn test_list_services() {
    let (server, client) = setup().await;

    let body = json!([
        { "id": 1, "name": "router", "url": "192.168.1.1", "type": "ping",
          "status": "Up", "response_time": 3.2 },
        { "id": 2, "name": "blog", "url": "https://example.com", "type": "http",
          "status": "Down", "response_time": 0 }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let services = client.list_services().await.unwrap();

    assert_eq!(services.len(), 2);
    assert_eq!(services[0].kind, ServiceKind::Ping);
    assert_eq!(services[0].status, ServiceStatus::Up);
    assert_eq!(services[1].status, ServiceStatus::Down);
}

#[tokio::test]
async fn test_create_service_sends_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services"))
        .and(body_json(json!({
            "name": "router", "url": "192.168.1.1", "type": "ping"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success", "message": "Service added"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = ServicePayload {
        id: None,
        name: "router".into(),
        url: "192.168.1.1".into(),
        kind: ServiceKind::Ping,
    };
    client.create_service(&payload).await.unwrap();
}

#[tokio::test]
async fn test_update_service_includes_id() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/services"))
        .and(body_json(json!({
            "id": 4, "name": "blog", "url": "https://example.com", "type": "http"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success", "message": "Service updated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = ServicePayload {
        id: Some(4),
        name: "blog".into(),
        url: "https://example.com".into(),
        kind: ServiceKind::Http,
    };
    client.update_service(&payload).await.unwrap();
}

#[tokio::test]
async fn test_delete_service() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/services/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_service(9).await.unwrap();
}

#[tokio::test]
async fn test_scan_network() {
    let (server, client) = setup().await;

    let body = json!([
        { "ip": "192.168.1.1", "mac": "00-11-22-33-44-55" },
        { "ip": "192.168.1.23", "mac": "aa-bb-cc-dd-ee-ff" }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/network/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let devices = client.scan_network().await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].ip, "192.168.1.1");
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_message_from_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "error", "message": "Service not found"
        })))
        .mount(&server)
        .await;

    let payload = ServicePayload {
        id: Some(99),
        name: "ghost".into(),
        url: "10.0.0.9".into(),
        kind: ServiceKind::Ping,
    };
    let result = client.update_service(&payload).await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Service not found");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_500_without_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.get_metrics().await;

    match result {
        Err(Error::Api { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_ack() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error", "message": "Missing data"
        })))
        .mount(&server)
        .await;

    let payload = ServicePayload {
        id: None,
        name: "x".into(),
        url: "y".into(),
        kind: ServiceKind::Http,
    };
    let result = client.create_service(&payload).await;

    match result {
        Err(Error::Rejected { ref message }) => assert_eq!(message, "Missing data"),
        other => panic!("expected Rejected error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_keeps_raw_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let result = client.get_metrics().await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => {
            assert!(body.contains("proxy error"));
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

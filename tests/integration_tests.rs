// Integration tests: HTTP and WebSocket endpoints

mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use common::{FakeSource, event, node};
use noc_watch::backend_repo::{DataSource, FetchError};
use noc_watch::config::AppConfig;
use noc_watch::models::*;
use noc_watch::routes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

const TEST_CONFIG: &str = r#"
[backend]
base_url = "http://127.0.0.1:1/api"

[refresh]
interval_ms = 5000
clock_interval_ms = 1000

[feed]
mode = "server"

[server]
port = 8090
host = "127.0.0.1"
"#;

const NOW: i64 = 1_700_000_000_000;

fn test_app_config() -> AppConfig {
    AppConfig::load_from_str(TEST_CONFIG).unwrap()
}

struct TestApp {
    router: axum::Router,
    state_tx: watch::Sender<DashboardState>,
    ws_connections: Arc<AtomicUsize>,
    _clock_tx: watch::Sender<i64>,
}

fn test_app(source: Arc<dyn DataSource>) -> TestApp {
    let (state_tx, state_rx) = watch::channel(DashboardState::default());
    let (clock_tx, clock_rx) = watch::channel(NOW);
    let ws_connections = Arc::new(AtomicUsize::new(0));
    let router = routes::app(
        state_rx,
        clock_rx,
        source,
        ws_connections.clone(),
        test_app_config(),
    );
    TestApp {
        router,
        state_tx,
        ws_connections,
        _clock_tx: clock_tx,
    }
}

fn empty_source() -> Arc<dyn DataSource> {
    Arc::new(FakeSource::new(vec![]))
}

fn committed_state() -> DashboardState {
    let view = DashboardView {
        generated_at: NOW,
        nodes: vec![NodeRow {
            node: node("edge-1", NodeStatus::Critical),
            online: true,
            lagging: false,
        }],
        metrics: MetricsSnapshot {
            total_nodes: 1,
            critical_count: 1,
            online_count: 1,
            ..MetricsSnapshot::default()
        },
        timeline: vec![event(NOW, Severity::Critical)],
        active_alerts: vec![event(NOW, Severity::Critical)],
        incidents: vec![],
    };
    DashboardState {
        phase: RefreshPhase::Success,
        view: Some(Arc::new(view)),
        applied_cycle: 1,
        last_updated: Some(NOW),
        last_error: None,
        consecutive_failures: 0,
    }
}

/// Node detail lookups always fail with a transport error.
struct UnreachableSource;

#[async_trait]
impl DataSource for UnreachableSource {
    async fn fetch_nodes(&self) -> Result<Vec<Node>, FetchError> {
        Err(FetchError::network("connection refused"))
    }

    async fn fetch_node_detail(&self, _node_id: &str) -> Result<Node, FetchError> {
        Err(FetchError::network("connection refused"))
    }

    async fn fetch_node_events(
        &self,
        _node_id: &str,
        _limit: usize,
    ) -> Result<Vec<Event>, FetchError> {
        Err(FetchError::network("connection refused"))
    }

    async fn fetch_active_alerts(&self) -> Result<Vec<Event>, FetchError> {
        Err(FetchError::network("connection refused"))
    }

    async fn fetch_timeline(&self, _limit: usize) -> Result<Vec<Event>, FetchError> {
        Err(FetchError::network("connection refused"))
    }
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = test_app(empty_source());
    let server = TestServer::new(app.router);
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("noc-watch: NOC dashboard state engine");
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = test_app(empty_source());
    let server = TestServer::new(app.router);
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("noc-watch"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_dashboard_is_loading_before_first_cycle() {
    let app = test_app(empty_source());
    let server = TestServer::new(app.router);
    let json: serde_json::Value = server.get("/api/dashboard").await.json();
    assert!(json["view"].is_null());
    assert_eq!(json["phase"], "IDLE");
}

#[tokio::test]
async fn test_dashboard_reflects_published_state() {
    let app = test_app(empty_source());
    app.state_tx.send(committed_state()).unwrap();
    let server = TestServer::new(app.router);

    let json: serde_json::Value = server.get("/api/dashboard").await.json();
    assert_eq!(json["appliedCycle"], 1);
    assert_eq!(json["view"]["metrics"]["totalNodes"], 1);
    assert_eq!(json["view"]["metrics"]["criticalCount"], 1);
    assert_eq!(json["view"]["nodes"][0]["node"]["node_id"], "edge-1");
    assert_eq!(json["view"]["activeAlerts"][0]["severity"], "CRITICAL");
}

#[tokio::test]
async fn test_clock_endpoint() {
    let app = test_app(empty_source());
    let server = TestServer::new(app.router);
    let json: serde_json::Value = server.get("/api/clock").await.json();
    assert_eq!(json["now"], NOW);
    assert!(json["local"].as_str().is_some_and(|s| s.len() == 8));
}

#[tokio::test]
async fn test_node_detail_found() {
    let mut detail = node("edge-7", NodeStatus::Warning);
    detail.last_seen = Some(now_ms() - 5_000);
    let source = FakeSource::new(vec![]).with_detail(
        detail,
        vec![event(1, Severity::Info), event(2, Severity::Warning)],
    );
    let app = test_app(Arc::new(source));
    let server = TestServer::new(app.router);

    let response = server.get("/api/nodes/edge-7").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["node"]["node"]["node_id"], "edge-7");
    assert_eq!(json["node"]["online"], true);
    assert_eq!(json["events"][0]["occurred_at"], 2);
    assert_eq!(json["events"][1]["occurred_at"], 1);
}

#[tokio::test]
async fn test_node_detail_missing_is_404() {
    let app = test_app(empty_source());
    let server = TestServer::new(app.router);
    let response = server.get("/api/nodes/ghost").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let json: serde_json::Value = response.json();
    assert_eq!(
        json["error"],
        "Failed to load node ghost. It may not exist."
    );
}

#[tokio::test]
async fn test_node_detail_backend_failure_is_502() {
    let app = test_app(Arc::new(UnreachableSource));
    let server = TestServer::new(app.router);
    let response = server.get("/api/nodes/edge-1").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = response.json();
    assert!(
        json["error"]
            .as_str()
            .is_some_and(|e| e.contains("connection refused"))
    );
}

#[tokio::test]
async fn test_node_detail_missing_history_is_502_not_404() {
    let mut source = FakeSource::new(vec![]).with_detail(node("edge-3", NodeStatus::Healthy), vec![]);
    source.node_events_error = Some(FetchError::NotFound("edge-3".into()));
    let app = test_app(Arc::new(source));
    let server = TestServer::new(app.router);

    let response = server.get("/api/nodes/edge-3").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = response.json();
    assert!(
        json["error"]
            .as_str()
            .is_some_and(|e| !e.contains("may not exist"))
    );
}

// --- /ws/dashboard ---
// Skips non-JSON frames until a dashboard state arrives.

async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_dashboard_sends_current_state_then_updates() {
    let TestApp {
        router,
        state_tx,
        ws_connections,
        _clock_tx,
    } = test_app(empty_source());
    let server = TestServer::builder().http_transport().build(router);
    let mut ws = server
        .get_websocket("/ws/dashboard")
        .await
        .into_websocket()
        .await;

    let first: serde_json::Value = receive_first_json_text(&mut ws).await;
    assert!(first["view"].is_null());
    assert_eq!(ws_connections.load(Ordering::Relaxed), 1);

    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let _ = state_tx.send(committed_state());
    });
    let next: serde_json::Value = receive_first_json_text(&mut ws).await;
    assert_eq!(next["appliedCycle"], 1);
    assert_eq!(next["view"]["metrics"]["totalNodes"], 1);
}

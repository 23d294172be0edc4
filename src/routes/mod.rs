// HTTP + WebSocket routes: hands computed view-models to the presentation layer

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};

use crate::backend_repo::DataSource;
use crate::config::AppConfig;
use crate::models::DashboardState;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) state_rx: watch::Receiver<DashboardState>,
    pub(crate) clock_rx: watch::Receiver<i64>,
    pub(crate) source: Arc<dyn DataSource>,
    pub(crate) ws_dashboard_connections: Arc<AtomicUsize>,
    pub(crate) config: AppConfig,
}

pub fn app(
    state_rx: watch::Receiver<DashboardState>,
    clock_rx: watch::Receiver<i64>,
    source: Arc<dyn DataSource>,
    ws_dashboard_connections: Arc<AtomicUsize>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        state_rx,
        clock_rx,
        source,
        ws_dashboard_connections,
        config,
    };
    Router::new()
        .route("/", get(|| async { "noc-watch: NOC dashboard state engine" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/dashboard", get(http::dashboard_handler)) // GET /api/dashboard
        .route("/api/clock", get(http::clock_handler)) // GET /api/clock
        .route("/api/nodes/{id}", get(http::node_detail_handler)) // GET /api/nodes/{id}
        .route("/ws/dashboard", get(ws::ws_dashboard)) // WS /ws/dashboard
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

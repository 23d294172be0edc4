// GET handlers: version, dashboard state, clock, node detail

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::backend_repo::FetchError;
use crate::feed::load_node_detail;
use crate::models::now_ms;
use crate::version::{NAME, VERSION};

/// GET /version: package name and version.
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/dashboard: latest published state. `view` is null while loading.
pub(super) async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    let current = state.state_rx.borrow().clone();
    Json(current)
}

/// GET /api/clock: latest wall-clock tick, independent of data refresh.
pub(super) async fn clock_handler(State(state): State<AppState>) -> impl IntoResponse {
    let now = *state.clock_rx.borrow();
    let local = chrono::DateTime::from_timestamp_millis(now)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_default();
    Json(serde_json::json!({
        "now": now,
        "local": local,
    }))
}

/// GET /api/nodes/{id}: node detail plus its event history, fetched on demand.
pub(super) async fn node_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let result = load_node_detail(
        state.source.as_ref(),
        &id,
        state.config.feed.node_events_limit,
        now_ms(),
        state.config.liveness_window(),
    )
    .await;

    match result {
        Ok(detail) => Json(detail).into_response(),
        Err(FetchError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("Failed to load node {id}. It may not exist."),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, node_id = %id, operation = "load_node_detail", "node detail fetch failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

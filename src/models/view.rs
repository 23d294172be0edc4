// View-models handed to the presentation layer, and the refresh state container

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Event, MetricsSnapshot, Node};

/// A node plus what the engine derived about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRow {
    pub node: Node,
    /// Liveness from `last_seen`; independent of `node.status`.
    pub online: bool,
    pub lagging: bool,
}

/// Everything one successful refresh cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Epoch ms when the cycle's data was committed.
    pub generated_at: i64,
    pub nodes: Vec<NodeRow>,
    pub metrics: MetricsSnapshot,
    /// Newest first, bounded.
    pub timeline: Vec<Event>,
    /// Subset of `timeline` with CRITICAL/WARNING severity, same relative order.
    pub active_alerts: Vec<Event>,
    /// Server-side incident records (`/alerts/active`); empty in client-synthesis mode.
    #[serde(default)]
    pub incidents: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetailView {
    pub node: NodeRow,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RefreshPhase {
    #[default]
    Idle,
    Fetching,
    Success,
    Failure,
}

/// Latest state published by the refresh scheduler. `view` is `None` only before the
/// first successful cycle (loading); failures after that keep the previous view.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub phase: RefreshPhase,
    pub view: Option<Arc<DashboardView>>,
    /// Sequence number of the cycle whose result is in `view`.
    pub applied_cycle: u64,
    /// Epoch ms of the last successful commit.
    pub last_updated: Option<i64>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl DashboardState {
    pub fn is_loading(&self) -> bool {
        self.view.is_none()
    }

    /// Showing data from an earlier cycle because the latest one failed.
    pub fn is_stale(&self) -> bool {
        self.view.is_some() && self.consecutive_failures > 0
    }
}

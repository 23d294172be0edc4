// Domain models: nodes, events, metrics and view-models

mod event;
mod metrics;
mod node;
mod view;
pub mod wire;

pub use event::{Event, EventType, Severity};
pub use metrics::{IdrGrade, MetricsSnapshot};
pub use node::{BufferStatus, Node, NodeStatus};
pub use view::{DashboardState, DashboardView, NodeDetailView, NodeRow, RefreshPhase};

/// Current wall-clock time as epoch milliseconds.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}

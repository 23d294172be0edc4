// Metrics aggregation: pure reduction of a node collection into summary counts

use std::time::Duration;

use super::liveness::is_online;
use crate::models::{IdrGrade, MetricsSnapshot, Node, NodeStatus};

/// Reduce `nodes` to a MetricsSnapshot. Same input, same output; no I/O.
pub fn aggregate(nodes: &[Node], now_ms: i64, liveness_window: Duration) -> MetricsSnapshot {
    let mut m = MetricsSnapshot {
        total_nodes: nodes.len(),
        ..Default::default()
    };

    for node in nodes {
        match node.status {
            NodeStatus::Healthy => m.healthy_count += 1,
            NodeStatus::Warning => m.warning_count += 1,
            NodeStatus::Critical => m.critical_count += 1,
            NodeStatus::Online => m.declared_online += 1,
            NodeStatus::Degraded => m.degraded_count += 1,
            NodeStatus::Offline => m.offline_count += 1,
            NodeStatus::Unknown(_) => m.unknown_count += 1,
        }
        if is_online(node.last_seen, now_ms, liveness_window) {
            m.online_count += 1;
        }
        if node.is_lagging() {
            m.lagging_count += 1;
        }
    }

    m.average_idr = average_idr(nodes);
    m.idr_grade = IdrGrade::from_average(m.average_idr);
    m
}

/// Mean IDR with missing values counted as 0, rounded to one decimal. 0 for no nodes.
pub fn average_idr(nodes: &[Node]) -> f64 {
    if nodes.is_empty() {
        return 0.0;
    }
    let sum: f64 = nodes.iter().map(|n| n.idr.unwrap_or(0.0)).sum();
    round1(sum / nodes.len() as f64)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// Event timeline: ordering/truncation, and client-side synthesis from node state.
// Synthesis takes time and randomness as arguments so callers can pin both.

use std::cmp::Reverse;

use rand::Rng;

use crate::models::{Event, EventType, Node, NodeStatus, Severity};

pub const SOURCE_STATUS_MONITOR: &str = "status-monitor";
pub const SOURCE_SCHEDULER: &str = "scheduler";
pub const SOURCE_REGISTRY: &str = "registry";

/// Knobs for `derive_events`.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisPolicy {
    /// WARNING alerts are back-dated by a uniform 0..=max seconds.
    pub max_warning_lag_secs: u64,
    /// Heartbeat is stamped this many seconds in the past.
    pub heartbeat_lag_secs: u64,
    /// Chance of a NODE_REGISTER event per cycle.
    pub register_probability: f64,
    /// Keep only the newest N.
    pub limit: usize,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        Self {
            max_warning_lag_secs: 300,
            heartbeat_lag_secs: 60,
            register_probability: 0.3,
            limit: 10,
        }
    }
}

/// Sort newest first (stable, so equal timestamps keep insertion order) and keep `limit`.
pub fn order_timeline(mut events: Vec<Event>, limit: usize) -> Vec<Event> {
    events.sort_by_key(|e| Reverse(e.occurred_at));
    events.truncate(limit);
    events
}

/// Transient events derived from the current node snapshot only:
/// CRITICAL nodes alert at `now`, WARNING nodes at a random recent offset, one heartbeat,
/// and sometimes a registration of a synthetic node.
pub fn derive_events<R: Rng + ?Sized>(
    nodes: &[Node],
    now_ms: i64,
    policy: &SynthesisPolicy,
    rng: &mut R,
) -> Vec<Event> {
    let mut events = Vec::new();

    for node in nodes.iter().filter(|n| n.status == NodeStatus::Critical) {
        events.push(Event::new(
            EventType::Alert,
            Severity::Critical,
            Some(node.node_id.clone()),
            format!("{} reported CRITICAL status", node.display_name()),
            now_ms,
            SOURCE_STATUS_MONITOR,
        ));
    }

    for node in nodes.iter().filter(|n| n.status == NodeStatus::Warning) {
        let lag_secs = rng.gen_range(0..=policy.max_warning_lag_secs);
        events.push(Event::new(
            EventType::Alert,
            Severity::Warning,
            Some(node.node_id.clone()),
            format!("{} reported WARNING status", node.display_name()),
            now_ms.saturating_sub(secs_to_ms(lag_secs)),
            SOURCE_STATUS_MONITOR,
        ));
    }

    events.push(Event::new(
        EventType::Heartbeat,
        Severity::Info,
        None,
        format!("Heartbeat received from {} nodes", nodes.len()),
        now_ms.saturating_sub(secs_to_ms(policy.heartbeat_lag_secs)),
        SOURCE_SCHEDULER,
    ));

    if rng.gen_bool(policy.register_probability.clamp(0.0, 1.0)) {
        let node_id = format!("node-{:04x}", rng.gen_range(0..=0xffffu32));
        events.push(Event::new(
            EventType::NodeRegister,
            Severity::Info,
            Some(node_id.clone()),
            format!("Node {node_id} registered"),
            now_ms,
            SOURCE_REGISTRY,
        ));
    }

    order_timeline(events, policy.limit)
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX)
}

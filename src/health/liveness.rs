// Liveness: a node is online when it was seen within the freshness window

use std::time::Duration;

/// Default freshness window.
pub const LIVENESS_WINDOW: Duration = Duration::from_secs(60);

/// `now_ms - last_seen_ms < window`. A node that was never seen is offline.
/// Declared status plays no part here.
pub fn is_online(last_seen_ms: Option<i64>, now_ms: i64, window: Duration) -> bool {
    match last_seen_ms {
        Some(seen) => now_ms.saturating_sub(seen) < window.as_millis() as i64,
        None => false,
    }
}

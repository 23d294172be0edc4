// Active alert selection

use crate::models::Event;

/// CRITICAL and WARNING events from `feed`, in feed order. Empty means "no active alerts".
pub fn select_active_alerts(feed: &[Event]) -> Vec<Event> {
    feed.iter().filter(|e| e.is_active_alert()).cloned().collect()
}

// Health derivation: metrics, liveness, timeline and alerts. All pure functions.

pub mod alerts;
pub mod liveness;
pub mod metrics;
pub mod timeline;

pub use alerts::select_active_alerts;
pub use liveness::{LIVENESS_WINDOW, is_online};
pub use metrics::{aggregate, average_idr};
pub use timeline::{SynthesisPolicy, derive_events, order_timeline};

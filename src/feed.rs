// Event feed strategies and view assembly.
// Server-timeline mode reads the feed from the backend; client-synthesis mode derives it
// from the node snapshot. Both sit behind EventFeed and are picked once from config.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::backend_repo::{DataSource, FetchError};
use crate::config::{FeedConfig, FeedMode};
use crate::health::{self, SynthesisPolicy};
use crate::models::{DashboardView, Event, Node, NodeDetailView, NodeRow};

/// Source of "now" in epoch ms.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Raw material of one refresh cycle, before derivation.
#[derive(Debug, Clone, Default)]
pub struct CycleData {
    pub nodes: Vec<Node>,
    /// Newest first, already bounded.
    pub timeline: Vec<Event>,
    pub incidents: Vec<Event>,
}

#[async_trait]
pub trait EventFeed: Send + Sync {
    fn name(&self) -> &'static str;

    /// All reads for one cycle. Either everything succeeds or the cycle fails.
    async fn collect(&self, source: &dyn DataSource) -> Result<CycleData, FetchError>;
}

/// Nodes, active alerts and timeline are requested together; the cycle takes as long
/// as the slowest of the three.
#[derive(Debug, Clone)]
pub struct ServerTimelineFeed {
    limit: usize,
}

impl ServerTimelineFeed {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl EventFeed for ServerTimelineFeed {
    fn name(&self) -> &'static str {
        "server-timeline"
    }

    async fn collect(&self, source: &dyn DataSource) -> Result<CycleData, FetchError> {
        let (nodes, incidents, timeline) = tokio::try_join!(
            source.fetch_nodes(),
            source.fetch_active_alerts(),
            source.fetch_timeline(self.limit),
        )?;
        Ok(CycleData {
            nodes,
            timeline: health::order_timeline(timeline, self.limit),
            incidents,
        })
    }
}

/// Derives the feed locally. Output is non-deterministic unless seeded and given a fixed clock.
pub struct ClientSynthesisFeed {
    policy: SynthesisPolicy,
    rng: Mutex<StdRng>,
    clock: Clock,
}

impl ClientSynthesisFeed {
    pub fn new(policy: SynthesisPolicy, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            policy,
            rng: Mutex::new(rng),
            clock: Arc::new(crate::models::now_ms),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl EventFeed for ClientSynthesisFeed {
    fn name(&self) -> &'static str {
        "client-synthesis"
    }

    async fn collect(&self, source: &dyn DataSource) -> Result<CycleData, FetchError> {
        let nodes = source.fetch_nodes().await?;
        let now = (self.clock)();
        let timeline = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            health::derive_events(&nodes, now, &self.policy, &mut *rng)
        };
        Ok(CycleData {
            nodes,
            timeline,
            incidents: Vec::new(),
        })
    }
}

pub fn feed_from_config(config: &FeedConfig) -> Arc<dyn EventFeed> {
    match config.mode {
        FeedMode::Server => Arc::new(ServerTimelineFeed::new(config.timeline_limit)),
        FeedMode::Client => Arc::new(ClientSynthesisFeed::new(
            SynthesisPolicy {
                max_warning_lag_secs: config.max_warning_lag_secs,
                heartbeat_lag_secs: config.heartbeat_lag_secs,
                register_probability: config.register_probability,
                limit: config.synthesized_limit,
            },
            config.seed,
        )),
    }
}

pub fn node_row(node: Node, now_ms: i64, liveness_window: Duration) -> NodeRow {
    NodeRow {
        online: health::is_online(node.last_seen, now_ms, liveness_window),
        lagging: node.is_lagging(),
        node,
    }
}

/// Derive metrics, liveness and alerts from one cycle's data.
pub fn build_view(data: CycleData, now_ms: i64, liveness_window: Duration) -> DashboardView {
    let metrics = health::aggregate(&data.nodes, now_ms, liveness_window);
    let active_alerts = health::select_active_alerts(&data.timeline);
    let nodes = data
        .nodes
        .into_iter()
        .map(|n| node_row(n, now_ms, liveness_window))
        .collect();
    DashboardView {
        generated_at: now_ms,
        nodes,
        metrics,
        timeline: data.timeline,
        active_alerts,
        incidents: data.incidents,
    }
}

/// Node detail and its event history, fetched together.
/// Only a missing node surfaces as `FetchError::NotFound`; a missing history for a node
/// that exists is a `Network` failure.
pub async fn load_node_detail(
    source: &dyn DataSource,
    node_id: &str,
    events_limit: usize,
    now_ms: i64,
    liveness_window: Duration,
) -> Result<NodeDetailView, FetchError> {
    let (node, events) = tokio::join!(
        source.fetch_node_detail(node_id),
        source.fetch_node_events(node_id, events_limit),
    );
    // The detail lookup alone decides NotFound; the node exists past this point.
    let node = node?;
    let events = events.map_err(|e| match e {
        FetchError::NotFound(id) => FetchError::Network {
            status: Some(404),
            message: format!("event history for node {id} is unavailable"),
        },
        other => other,
    })?;
    Ok(NodeDetailView {
        node: node_row(node, now_ms, liveness_window),
        events: health::order_timeline(events, events_limit),
    })
}

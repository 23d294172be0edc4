// Shared test helpers: builders and a scripted in-memory data source
#![allow(dead_code)]

use async_trait::async_trait;
use noc_watch::backend_repo::{DataSource, FetchError};
use noc_watch::models::*;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn node(id: &str, status: NodeStatus) -> Node {
    Node {
        status,
        ..Node::new(id)
    }
}

pub fn node_with_idr(id: &str, idr: Option<f64>) -> Node {
    Node {
        idr,
        ..Node::new(id)
    }
}

pub fn event(occurred_at: i64, severity: Severity) -> Event {
    Event::new(
        EventType::Alert,
        severity,
        Some("node-1".into()),
        format!("event at {occurred_at}"),
        occurred_at,
        "test",
    )
}

/// One scripted `fetch_nodes` answer.
pub struct Step {
    pub delay: Duration,
    pub result: Result<Vec<Node>, FetchError>,
}

impl Step {
    pub fn ok(nodes: Vec<Node>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(nodes),
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(FetchError::Network {
                status: Some(503),
                message: message.to_string(),
            }),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// DataSource whose `fetch_nodes` replays a script, then repeats `fallback` forever.
pub struct FakeSource {
    script: Mutex<VecDeque<Step>>,
    fallback: Vec<Node>,
    pub alerts: Vec<Event>,
    pub timeline: Vec<Event>,
    pub details: HashMap<String, Node>,
    pub node_events: Vec<Event>,
    pub node_events_error: Option<FetchError>,
    node_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Vec::new(),
            alerts: Vec::new(),
            timeline: Vec::new(),
            details: HashMap::new(),
            node_events: Vec::new(),
            node_events_error: None,
            node_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_fallback(mut self, nodes: Vec<Node>) -> Self {
        self.fallback = nodes;
        self
    }

    pub fn with_timeline(mut self, timeline: Vec<Event>) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn with_detail(mut self, node: Node, events: Vec<Event>) -> Self {
        self.details.insert(node.node_id.clone(), node);
        self.node_events = events;
        self
    }

    pub fn node_calls(&self) -> usize {
        self.node_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for FakeSource {
    async fn fetch_nodes(&self) -> Result<Vec<Node>, FetchError> {
        self.node_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                if !step.delay.is_zero() {
                    tokio::time::sleep(step.delay).await;
                }
                step.result
            }
            None => Ok(self.fallback.clone()),
        }
    }

    async fn fetch_node_detail(&self, node_id: &str) -> Result<Node, FetchError> {
        self.details
            .get(node_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(node_id.to_string()))
    }

    async fn fetch_node_events(
        &self,
        _node_id: &str,
        limit: usize,
    ) -> Result<Vec<Event>, FetchError> {
        if let Some(e) = &self.node_events_error {
            return Err(e.clone());
        }
        Ok(self.node_events.iter().take(limit).cloned().collect())
    }

    async fn fetch_active_alerts(&self) -> Result<Vec<Event>, FetchError> {
        Ok(self.alerts.clone())
    }

    async fn fetch_timeline(&self, limit: usize) -> Result<Vec<Event>, FetchError> {
        Ok(self.timeline.iter().take(limit).cloned().collect())
    }
}

// Timeline events: server-provided or synthesized from node state

use serde::{Deserialize, Serialize};

use super::{NodeStatus, wire};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Alert,
    Heartbeat,
    NodeRegister,
    Other(String),
}

impl EventType {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.to_ascii_uppercase().as_str() {
            "ALERT" => EventType::Alert,
            "HEARTBEAT" => EventType::Heartbeat,
            "NODE_REGISTER" => EventType::NodeRegister,
            _ => EventType::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Alert => "ALERT",
            EventType::Heartbeat => "HEARTBEAT",
            EventType::NodeRegister => "NODE_REGISTER",
            EventType::Other(raw) => raw,
        }
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        EventType::parse(&s)
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.as_str().to_string()
    }
}

/// Event severity. Absent on the wire means informational; unrecognized values are
/// kept in `Other` and never count as an active alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Critical,
    Warning,
    #[default]
    Info,
    Other(String),
}

impl Severity {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.to_ascii_uppercase().as_str() {
            "CRITICAL" => Severity::Critical,
            "WARNING" => Severity::Warning,
            "INFO" | "" => Severity::Info,
            _ => Severity::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Other(raw) => raw,
        }
    }

    /// CRITICAL or WARNING.
    pub fn is_active_alert(&self) -> bool {
        matches!(self, Severity::Critical | Severity::Warning)
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Severity::parse(&s)
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.as_str().to_string()
    }
}

/// Immutable point-in-time occurrence. `occurred_at` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEvent")]
pub struct Event {
    pub event_type: EventType,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
    pub occurred_at: i64,
    pub source: String,
}

impl Event {
    pub fn new(
        event_type: EventType,
        severity: Severity,
        node_id: Option<String>,
        message: impl Into<String>,
        occurred_at: i64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            severity,
            node_id,
            message: message.into(),
            occurred_at,
            source: source.into(),
        }
    }

    pub fn is_active_alert(&self) -> bool {
        self.severity.is_active_alert()
    }
}

/// Wire shape. `/alerts/active` returns node-like records (`status`, `last_seen`)
/// instead of `severity`/`occurred_at`; those are folded in here.
#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    event_type: Option<EventType>,
    #[serde(default)]
    severity: Option<Severity>,
    #[serde(default)]
    status: Option<NodeStatus>,
    #[serde(default)]
    node_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, deserialize_with = "wire::epoch_ms")]
    occurred_at: Option<i64>,
    #[serde(default, deserialize_with = "wire::epoch_ms")]
    last_seen: Option<i64>,
    #[serde(default)]
    source: Option<String>,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        let severity = match (raw.severity, &raw.status) {
            (Some(s), _) => s,
            (None, Some(NodeStatus::Critical | NodeStatus::Offline)) => Severity::Critical,
            (None, Some(NodeStatus::Warning | NodeStatus::Degraded)) => Severity::Warning,
            (None, _) => Severity::Info,
        };
        let event_type = match raw.event_type {
            Some(t) => t,
            None if raw.status.is_some() => EventType::Alert,
            None => EventType::Other(String::new()),
        };
        Event {
            event_type,
            severity,
            node_id: raw.node_id.filter(|id| !id.is_empty()),
            message: raw.message.unwrap_or_default(),
            occurred_at: raw.occurred_at.or(raw.last_seen).unwrap_or(0),
            source: raw.source.unwrap_or_default(),
        }
    }
}

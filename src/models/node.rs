// Node inventory records as produced by the backend

use serde::{Deserialize, Serialize};

use super::wire;

/// Declared node status. Producers disagree on vocabulary, so anything outside the
/// known set is kept verbatim in `Unknown` instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeStatus {
    Healthy,
    Warning,
    Critical,
    Online,
    Degraded,
    Offline,
    Unknown(String),
}

impl NodeStatus {
    /// Case-insensitive parse; never fails.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.to_ascii_uppercase().as_str() {
            "HEALTHY" => NodeStatus::Healthy,
            "WARNING" => NodeStatus::Warning,
            "CRITICAL" => NodeStatus::Critical,
            "ONLINE" => NodeStatus::Online,
            "DEGRADED" => NodeStatus::Degraded,
            "OFFLINE" => NodeStatus::Offline,
            _ => NodeStatus::Unknown(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeStatus::Healthy => "HEALTHY",
            NodeStatus::Warning => "WARNING",
            NodeStatus::Critical => "CRITICAL",
            NodeStatus::Online => "ONLINE",
            NodeStatus::Degraded => "DEGRADED",
            NodeStatus::Offline => "OFFLINE",
            NodeStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, NodeStatus::Unknown(_))
    }
}

impl Default for NodeStatus {
    fn default() -> Self {
        NodeStatus::Unknown(String::new())
    }
}

impl From<String> for NodeStatus {
    fn from(s: String) -> Self {
        NodeStatus::parse(&s)
    }
}

impl From<NodeStatus> for String {
    fn from(s: NodeStatus) -> Self {
        s.as_str().to_string()
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Telemetry buffer state reported by the node collector. `Active` means the node is
/// replaying buffered payloads and its numbers lag behind real time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferStatus {
    Active,
    #[default]
    #[serde(other)]
    Inactive,
}

/// One node as returned by `GET /nodes` or `GET /nodes/{id}`.
/// Every field except `node_id` is optional on the wire; `last_seen` is normalized to epoch ms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "wire::null_default")]
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "wire::epoch_ms")]
    pub last_seen: Option<i64>,
    #[serde(default, deserialize_with = "wire::lenient_f64")]
    pub idr: Option<f64>,
    #[serde(default, deserialize_with = "wire::lenient_f64")]
    pub cpu: Option<f64>,
    #[serde(default, deserialize_with = "wire::lenient_f64")]
    pub ram: Option<f64>,
    #[serde(default, deserialize_with = "wire::lenient_f64")]
    pub disk: Option<f64>,
    #[serde(default, deserialize_with = "wire::null_default")]
    pub buffer_status: BufferStatus,
}

impl Node {
    /// Minimal node with only an id; everything else defaulted.
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            hostname: None,
            status: NodeStatus::default(),
            ip: None,
            version: None,
            last_seen: None,
            idr: None,
            cpu: None,
            ram: None,
            disk: None,
            buffer_status: BufferStatus::Inactive,
        }
    }

    /// Hostname when present and non-blank, otherwise the node id.
    pub fn display_name(&self) -> &str {
        match self.hostname.as_deref() {
            Some(h) if !h.trim().is_empty() => h,
            _ => &self.node_id,
        }
    }

    pub fn is_lagging(&self) -> bool {
        self.buffer_status == BufferStatus::Active
    }
}

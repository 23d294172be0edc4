// Backend data source: typed fetches for nodes, alerts and timelines. No business logic here.

mod decode;
mod http;

pub use decode::{decode_list, decode_one};
pub use http::{HttpDataSource, TENANT_HEADER};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Event, Node};

/// Tenant used when none is configured.
pub const DEFAULT_TENANT: &str = "default";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Transport failure or non-2xx response.
    #[error("network error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// The requested node has no matching record.
    #[error("node {0} not found")]
    NotFound(String),

    /// Response body does not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        FetchError::Network {
            status: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Network {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

/// Read side of the backend. Failures propagate unmodified; there are no retries here.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_nodes(&self) -> Result<Vec<Node>, FetchError>;

    async fn fetch_node_detail(&self, node_id: &str) -> Result<Node, FetchError>;

    async fn fetch_node_events(&self, node_id: &str, limit: usize)
    -> Result<Vec<Event>, FetchError>;

    async fn fetch_active_alerts(&self) -> Result<Vec<Event>, FetchError>;

    async fn fetch_timeline(&self, limit: usize) -> Result<Vec<Event>, FetchError>;
}

// HTTP implementation of DataSource against the `/api` backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};

use super::{DEFAULT_TENANT, DataSource, FetchError, decode_list, decode_one};
use crate::models::{Event, Node};

pub const TENANT_HEADER: &str = "X-Tenant-ID";

#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: Client,
    base_url: String,
    tenant_id: String,
}

impl HttpDataSource {
    /// `base_url` includes the API base path, e.g. `http://central:8000/api`.
    /// A blank `tenant_id` falls back to `"default"`.
    pub fn new(base_url: &str, tenant_id: &str, timeout: Duration) -> anyhow::Result<Self> {
        let tenant_id = if tenant_id.trim().is_empty() {
            DEFAULT_TENANT.to_string()
        } else {
            tenant_id.trim().to_string()
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(TENANT_HEADER, HeaderValue::from_str(&tenant_id)?);

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(crate::version::user_agent())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tenant_id,
        })
    }

    pub fn from_config(config: &crate::config::BackendConfig) -> anyhow::Result<Self> {
        Self::new(
            &config.base_url,
            &config.tenant_id,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, limit: Option<usize>) -> Result<reqwest::Response, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        let response = request.send().await?;
        tracing::debug!(operation = "http_get", path, status = %response.status(), "backend response");
        Ok(response)
    }

    async fn body(response: reqwest::Response, path: &str) -> Result<bytes::Bytes, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network {
                status: Some(status.as_u16()),
                message: format!("GET {path} returned {status}"),
            });
        }
        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_nodes(&self) -> Result<Vec<Node>, FetchError> {
        let path = "/nodes";
        let body = Self::body(self.get(path, None).await?, path).await?;
        let nodes: Vec<Node> = decode_list(&body, "nodes")?;
        for node in nodes.iter().filter(|n| n.status.is_unknown()) {
            tracing::debug!(
                node_id = %node.node_id,
                status = %node.status,
                "node status outside known vocabulary"
            );
        }
        Ok(nodes)
    }

    async fn fetch_node_detail(&self, node_id: &str) -> Result<Node, FetchError> {
        let path = format!("/nodes/{}", encode_segment(node_id));
        let response = self.get(&path, None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(node_id.to_string()));
        }
        let body = Self::body(response, &path).await?;
        // Some producers answer 200 with `null` for an unknown id.
        let node: Option<Node> = decode_one(&body, "node detail")?;
        node.ok_or_else(|| FetchError::NotFound(node_id.to_string()))
    }

    async fn fetch_node_events(
        &self,
        node_id: &str,
        limit: usize,
    ) -> Result<Vec<Event>, FetchError> {
        let path = format!("/nodes/{}/events", encode_segment(node_id));
        let response = self.get(&path, Some(limit)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(node_id.to_string()));
        }
        let body = Self::body(response, &path).await?;
        decode_list(&body, "node events")
    }

    async fn fetch_active_alerts(&self) -> Result<Vec<Event>, FetchError> {
        let path = "/alerts/active";
        let body = Self::body(self.get(path, None).await?, path).await?;
        decode_list(&body, "active alerts")
    }

    async fn fetch_timeline(&self, limit: usize) -> Result<Vec<Event>, FetchError> {
        let path = "/timeline";
        let body = Self::body(self.get(path, Some(limit)).await?, path).await?;
        decode_list(&body, "timeline")
    }
}

// One path segment; everything outside the unreserved set is percent-encoded
fn encode_segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

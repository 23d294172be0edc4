use serde::Deserialize;

use crate::backend_repo::DEFAULT_TENANT;

/// Env var that overrides `backend.tenant_id` when set and non-blank.
pub const TENANT_ENV: &str = "NOC_TENANT_ID";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub refresh: RefreshConfig,
    pub feed: FeedConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL including the API path, e.g. `http://central:8000/api`.
    pub base_url: String,
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_tenant_id() -> String {
    DEFAULT_TENANT.to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    pub interval_ms: u64,
    pub clock_interval_ms: u64,
    /// Skip a tick while the previous cycle is still outstanding.
    #[serde(default = "default_true")]
    pub skip_when_in_flight: bool,
    #[serde(default = "default_liveness_window_secs")]
    pub liveness_window_secs: u64,
    /// How often to log refresh stats (cycles ok/failed, nodes, alerts) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_liveness_window_secs() -> u64 {
    60
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Backend provides `/timeline` and `/alerts/active`.
    Server,
    /// Timeline is synthesized from node state.
    Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub mode: FeedMode,
    #[serde(default = "default_timeline_limit")]
    pub timeline_limit: usize,
    #[serde(default = "default_node_events_limit")]
    pub node_events_limit: usize,
    #[serde(default = "default_synthesized_limit")]
    pub synthesized_limit: usize,
    #[serde(default = "default_max_warning_lag_secs")]
    pub max_warning_lag_secs: u64,
    #[serde(default = "default_heartbeat_lag_secs")]
    pub heartbeat_lag_secs: u64,
    #[serde(default = "default_register_probability")]
    pub register_probability: f64,
    /// Fixed seed for reproducible synthesis.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_timeline_limit() -> usize {
    20
}

fn default_node_events_limit() -> usize {
    50
}

fn default_synthesized_limit() -> usize {
    10
}

fn default_max_warning_lag_secs() -> u64 {
    300
}

fn default_heartbeat_lag_secs() -> u64 {
    60
}

fn default_register_probability() -> f64 {
    0.3
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    /// Loads from `CONFIG_FILE` (default `config.toml`), then applies `NOC_TENANT_ID`.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let config = Self::load_from_path(&path)?;
        Ok(config.with_tenant_override(std::env::var(TENANT_ENV).ok()))
    }

    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(s)?;
        if config.backend.tenant_id.trim().is_empty() {
            config.backend.tenant_id = default_tenant_id();
        }
        config.validate()?;
        Ok(config)
    }

    /// Replace the tenant when `value` is present and non-blank.
    pub fn with_tenant_override(mut self, value: Option<String>) -> Self {
        if let Some(tenant) = value.map(|v| v.trim().to_string())
            && !tenant.is_empty()
        {
            self.backend.tenant_id = tenant;
        }
        self
    }

    pub fn liveness_window(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh.liveness_window_secs)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.backend.base_url.trim().is_empty(),
            "backend.base_url must be non-empty"
        );
        anyhow::ensure!(
            self.backend.base_url.starts_with("http://")
                || self.backend.base_url.starts_with("https://"),
            "backend.base_url must start with http:// or https://, got {}",
            self.backend.base_url
        );
        anyhow::ensure!(
            self.backend.request_timeout_ms > 0,
            "backend.request_timeout_ms must be > 0, got {}",
            self.backend.request_timeout_ms
        );
        anyhow::ensure!(
            self.refresh.interval_ms > 0,
            "refresh.interval_ms must be > 0, got {}",
            self.refresh.interval_ms
        );
        anyhow::ensure!(
            self.refresh.clock_interval_ms > 0,
            "refresh.clock_interval_ms must be > 0, got {}",
            self.refresh.clock_interval_ms
        );
        anyhow::ensure!(
            self.refresh.liveness_window_secs > 0,
            "refresh.liveness_window_secs must be > 0, got {}",
            self.refresh.liveness_window_secs
        );
        anyhow::ensure!(
            self.refresh.stats_log_interval_secs > 0,
            "refresh.stats_log_interval_secs must be > 0, got {}",
            self.refresh.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.feed.timeline_limit > 0,
            "feed.timeline_limit must be > 0, got {}",
            self.feed.timeline_limit
        );
        anyhow::ensure!(
            self.feed.node_events_limit > 0,
            "feed.node_events_limit must be > 0, got {}",
            self.feed.node_events_limit
        );
        anyhow::ensure!(
            self.feed.synthesized_limit > 0,
            "feed.synthesized_limit must be > 0, got {}",
            self.feed.synthesized_limit
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.feed.register_probability),
            "feed.register_probability must be within [0, 1], got {}",
            self.feed.register_probability
        );
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        Ok(())
    }
}

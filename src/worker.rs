// Refresh scheduler: runs a fetch cycle immediately and then every interval, derives the
// dashboard view, and publishes it through a watch channel. A separate clock task ticks
// the wall-clock display independently of data fetching.

use crate::backend_repo::{DataSource, FetchError};
use crate::feed::{CycleData, EventFeed, build_view};
use crate::models::{DashboardState, RefreshPhase, now_ms};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Duration, interval};
use tracing::Instrument;

/// Data source, feed strategy, output channel and shutdown for the scheduler.
pub struct SchedulerDeps {
    pub source: Arc<dyn DataSource>,
    pub feed: Arc<dyn EventFeed>,
    pub state_tx: watch::Sender<DashboardState>,
    /// Live /ws/dashboard clients, reported in the stats line.
    pub ws_dashboard_connections: Arc<AtomicUsize>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Scheduler timing config.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval_ms: u64,
    /// When false, cycles may overlap; late results from older cycles are then dropped.
    pub skip_when_in_flight: bool,
    pub liveness_window: Duration,
    /// How often to log refresh stats (real seconds).
    pub stats_log_interval_secs: u64,
}

impl SchedulerConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        Self {
            interval_ms: config.refresh.interval_ms,
            skip_when_in_flight: config.refresh.skip_when_in_flight,
            liveness_window: config.liveness_window(),
            stats_log_interval_secs: config.refresh.stats_log_interval_secs,
        }
    }
}

#[derive(Debug, Default)]
struct CycleStats {
    succeeded: u64,
    failed: u64,
    skipped_ticks: u64,
    discarded: u64,
}

type CycleResult = (u64, Result<CycleData, FetchError>);

pub fn state_channel() -> (watch::Sender<DashboardState>, watch::Receiver<DashboardState>) {
    watch::channel(DashboardState::default())
}

/// Spawns the refresh loop. Returns when `shutdown_rx` fires (or its sender is dropped);
/// cycles still in flight are aborted and never touch the state.
pub fn spawn(deps: SchedulerDeps, config: SchedulerConfig) -> JoinHandle<()> {
    let SchedulerDeps {
        source,
        feed,
        state_tx,
        ws_dashboard_connections,
        mut shutdown_rx,
    } = deps;
    let SchedulerConfig {
        interval_ms,
        skip_when_in_flight,
        liveness_window,
        stats_log_interval_secs,
    } = config;

    let span = tracing::span!(
        tracing::Level::DEBUG,
        "refresh",
        interval_ms,
        feed = feed.name()
    );

    let task = async move {
        let mut tick = interval(Duration::from_millis(interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut cycles: JoinSet<CycleResult> = JoinSet::new();
        let mut next_cycle: u64 = 0;
        let mut last_completed: u64 = 0;
        let mut stats = CycleStats::default();

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    tracing::debug!(in_flight = cycles.len(), "Refresh scheduler shutting down");
                    break;
                }
                _ = tick.tick() => {
                    if skip_when_in_flight && !cycles.is_empty() {
                        stats.skipped_ticks += 1;
                        tracing::debug!(
                            in_flight = cycles.len(),
                            "previous refresh cycle still running; skipping tick"
                        );
                        continue;
                    }
                    next_cycle += 1;
                    let cycle = next_cycle;
                    state_tx.send_modify(|s| s.phase = RefreshPhase::Fetching);
                    let source = source.clone();
                    let feed = feed.clone();
                    cycles.spawn(async move { (cycle, feed.collect(source.as_ref()).await) });
                }
                Some(joined) = cycles.join_next() => {
                    match joined {
                        Ok((cycle, result)) => {
                            if cycle < last_completed {
                                stats.discarded += 1;
                                tracing::debug!(
                                    cycle,
                                    last_completed,
                                    "discarding result of stale refresh cycle"
                                );
                            } else {
                                last_completed = cycle;
                                apply_cycle(&state_tx, cycle, result, liveness_window, &mut stats);
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, operation = "refresh_cycle", "refresh task aborted");
                        }
                    }
                    if cycles.is_empty() {
                        state_tx.send_if_modified(|s| {
                            let was_busy = s.phase != RefreshPhase::Idle;
                            s.phase = RefreshPhase::Idle;
                            was_busy
                        });
                    }
                }
                _ = stats_log_tick.tick() => {
                    let state = state_tx.borrow();
                    let (nodes, alerts) = state
                        .view
                        .as_ref()
                        .map(|v| (v.nodes.len(), v.active_alerts.len()))
                        .unwrap_or((0, 0));
                    tracing::info!(
                        cycles_ok = stats.succeeded,
                        cycles_failed = stats.failed,
                        ticks_skipped = stats.skipped_ticks,
                        cycles_discarded = stats.discarded,
                        nodes,
                        active_alerts = alerts,
                        stale = state.is_stale(),
                        ws_dashboard_clients = ws_dashboard_connections.load(Ordering::Relaxed),
                        "refresh stats"
                    );
                }
            }
        }
        cycles.abort_all();
    };
    tokio::spawn(task.instrument(span))
}

/// Commit one completed cycle. Failures keep the previous view in place.
fn apply_cycle(
    state_tx: &watch::Sender<DashboardState>,
    cycle: u64,
    result: Result<CycleData, FetchError>,
    liveness_window: Duration,
    stats: &mut CycleStats,
) {
    match result {
        Ok(data) => {
            let now = now_ms();
            let view = Arc::new(build_view(data, now, liveness_window));
            stats.succeeded += 1;
            tracing::debug!(
                cycle,
                nodes = view.nodes.len(),
                timeline = view.timeline.len(),
                active_alerts = view.active_alerts.len(),
                "refresh cycle committed"
            );
            state_tx.send_modify(|s| {
                s.phase = RefreshPhase::Success;
                s.view = Some(view);
                s.applied_cycle = cycle;
                s.last_updated = Some(now);
                s.last_error = None;
                s.consecutive_failures = 0;
            });
        }
        Err(e) => {
            stats.failed += 1;
            state_tx.send_modify(|s| {
                s.phase = RefreshPhase::Failure;
                s.last_error = Some(e.to_string());
                s.consecutive_failures += 1;
                tracing::warn!(
                    error = %e,
                    cycle,
                    consecutive_failures = s.consecutive_failures,
                    has_snapshot = s.view.is_some(),
                    "refresh cycle failed; keeping last snapshot"
                );
            });
        }
    }
}

/// Owns a running scheduler: read-only state access plus teardown.
pub struct RefreshScheduler {
    state_rx: watch::Receiver<DashboardState>,
    ws_dashboard_connections: Arc<AtomicUsize>,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    pub fn start(
        source: Arc<dyn DataSource>,
        feed: Arc<dyn EventFeed>,
        config: SchedulerConfig,
    ) -> Self {
        let (state_tx, state_rx) = state_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let ws_dashboard_connections = Arc::new(AtomicUsize::new(0));
        let handle = spawn(
            SchedulerDeps {
                source,
                feed,
                state_tx,
                ws_dashboard_connections: ws_dashboard_connections.clone(),
                shutdown_rx,
            },
            config,
        );
        Self {
            state_rx,
            ws_dashboard_connections,
            shutdown_tx,
            handle,
        }
    }

    /// Receiver notified on every published state change.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state_rx.clone()
    }

    /// Counter the WebSocket route keeps current; read by the stats log.
    pub fn ws_dashboard_connections(&self) -> Arc<AtomicUsize> {
        self.ws_dashboard_connections.clone()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> DashboardState {
        self.state_rx.borrow().clone()
    }

    /// Stops the loop and waits for it; nothing mutates the state afterwards.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "refresh scheduler task ended abnormally");
        }
    }
}

/// Spawns the wall-clock ticker: publishes epoch ms every `period` until shutdown.
pub fn spawn_clock(
    period: Duration,
    tx: watch::Sender<i64>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(period);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let _ = tx.send(now_ms());
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Clock shutting down");
                    break;
                }
            }
        }
    })
}

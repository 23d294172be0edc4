use anyhow::Result;
use noc_watch::*;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let source: Arc<dyn backend_repo::DataSource> =
        Arc::new(backend_repo::HttpDataSource::from_config(&app_config.backend)?);
    let event_feed = feed::feed_from_config(&app_config.feed);
    tracing::info!(
        backend = %app_config.backend.base_url,
        tenant = %app_config.backend.tenant_id,
        feed = event_feed.name(),
        interval_ms = app_config.refresh.interval_ms,
        "Starting refresh scheduler"
    );

    let scheduler = worker::RefreshScheduler::start(
        source.clone(),
        event_feed,
        worker::SchedulerConfig::from_app_config(&app_config),
    );

    let (clock_tx, clock_rx) = watch::channel(models::now_ms());
    let (clock_shutdown_tx, clock_shutdown_rx) = tokio::sync::oneshot::channel();
    let clock_handle = worker::spawn_clock(
        tokio::time::Duration::from_millis(app_config.refresh.clock_interval_ms),
        clock_tx,
        clock_shutdown_rx,
    );

    let app = routes::app(
        scheduler.subscribe(),
        clock_rx,
        source,
        scheduler.ws_dashboard_connections(),
        app_config.clone(),
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
        }
    }

    scheduler.stop().await;
    let _ = clock_shutdown_tx.send(());
    let _ = clock_handle.await;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

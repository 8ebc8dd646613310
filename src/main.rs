use anyhow::Result;
use servicewatch::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

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
    let monitoring = &app_config.monitoring;

    // Bad service definitions are fatal before any polling starts.
    let registry = registry::ServiceRegistry::from_config(&app_config.services)?;
    tracing::info!(services = registry.len(), "service registry loaded");

    let runtime: Arc<dyn runtime::ContainerRuntime> = Arc::new(docker_repo::DockerRepo::connect(
        Duration::from_secs(monitoring.runtime_timeout_secs),
    )?);
    let prober: Arc<dyn probe::Prober> = Arc::new(probe::HttpProber::new()?);
    let containers = Arc::new(container_state::ContainerStateProvider::new(runtime));
    let evaluator = Arc::new(evaluator::ServiceHealthEvaluator::new(
        containers,
        prober,
        Duration::from_millis(monitoring.probe_timeout_ms),
    ));
    let aggregator = Arc::new(aggregator::FleetHealthAggregator::new(
        evaluator,
        Duration::from_millis(monitoring.evaluation_timeout_ms),
    ));

    let sysinfo_repo = Arc::new(sysinfo_repo::SysinfoRepo::new());
    let history = Arc::new(history::MetricsHistory::new(
        monitoring.history_capacity,
        Duration::from_secs(monitoring.history_max_age_secs),
    ));
    let (tx, _) =
        broadcast::channel::<models::HealthSnapshot>(app_config.publishing.broadcast_capacity);

    let ws_health_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            registry: registry.clone(),
            aggregator: aggregator.clone(),
            sysinfo_repo: sysinfo_repo.clone(),
            history: history.clone(),
            thresholds: app_config.alerts.clone(),
            tx: tx.clone(),
            ws_health_connections: ws_health_connections.clone(),
            polls_total: Arc::new(AtomicU64::new(0)),
            shutdown_rx,
        },
        worker::WorkerConfig {
            poll_interval_ms: monitoring.poll_interval_ms,
            stats_log_interval_secs: monitoring.stats_log_interval_secs,
        },
    );

    let app = routes::app(routes::RouteDeps {
        registry,
        aggregator,
        sysinfo_repo,
        history,
        thresholds: app_config.alerts.clone(),
        health_tx: tx,
        ws_health_connections,
    });
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = worker_handle.await;
        }
    }

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

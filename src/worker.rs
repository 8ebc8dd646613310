// Background health poller.
// Each tick: aggregate the fleet, read host metrics, derive alerts, append to history, broadcast.

use crate::aggregator::FleetHealthAggregator;
use crate::alerts;
use crate::history::MetricsHistory;
use crate::models::{
    Alert, AlertThresholds, HealthSnapshot, MetricsSample, OverallHealth, SystemMetrics, now_ms,
};
use crate::registry::ServiceRegistry;
use crate::sysinfo_repo::SysinfoRepo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

/// Rate limit for "no receivers" message (avoid logging every tick when no one is on /ws/health)
const NO_RECEIVERS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Collaborators, channels and shutdown for the worker.
pub struct WorkerDeps {
    pub registry: ServiceRegistry,
    pub aggregator: Arc<FleetHealthAggregator>,
    pub sysinfo_repo: Arc<SysinfoRepo>,
    pub history: Arc<MetricsHistory>,
    pub thresholds: AlertThresholds,
    pub tx: broadcast::Sender<HealthSnapshot>,
    pub ws_health_connections: Arc<AtomicUsize>,
    pub polls_total: Arc<AtomicU64>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing config.
pub struct WorkerConfig {
    pub poll_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Run one poll: aggregate, metrics, alerts. Host metrics failures are logged and reported as
/// zeroed metrics so the fleet report is still produced.
pub async fn poll_once(
    registry: &ServiceRegistry,
    aggregator: &FleetHealthAggregator,
    sysinfo_repo: &SysinfoRepo,
    thresholds: &AlertThresholds,
) -> HealthSnapshot {
    let (fleet, metrics) = tokio::join!(
        aggregator.aggregate(registry),
        sysinfo_repo.get_system_metrics()
    );
    let metrics = metrics.unwrap_or_else(|e| {
        tracing::warn!(error = %e, operation = "get_system_metrics", "system metrics failed");
        SystemMetrics::default()
    });
    let alerts = alerts::evaluate(&metrics, &fleet, thresholds);
    HealthSnapshot {
        timestamp: now_ms(),
        fleet,
        metrics,
        alerts,
    }
}

fn log_changes(
    snapshot: &HealthSnapshot,
    last_overall: &mut Option<OverallHealth>,
    last_alerts: &mut Vec<Alert>,
) {
    let overall = snapshot.fleet.overall;
    if last_overall.is_some_and(|prev| prev != overall) {
        tracing::warn!(
            from = ?last_overall,
            to = ?overall,
            healthy = snapshot.fleet.healthy_count,
            total = snapshot.fleet.total_count,
            "fleet health changed"
        );
    }
    *last_overall = Some(overall);

    for alert in &snapshot.alerts {
        let already_raised = last_alerts
            .iter()
            .any(|a| a.dimension == alert.dimension && a.level == alert.level);
        if !already_raised {
            tracing::warn!(
                dimension = ?alert.dimension,
                level = ?alert.level,
                value = alert.value,
                threshold = alert.threshold,
                "{}",
                alert.message
            );
        }
    }
    *last_alerts = snapshot.alerts.clone();
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        registry,
        aggregator,
        sysinfo_repo,
        history,
        thresholds,
        tx,
        ws_health_connections,
        polls_total,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        poll_interval_ms,
        stats_log_interval_secs,
    } = config;

    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", poll_interval_ms);

    tokio::spawn(
        async move {
            let mut tick = interval(Duration::from_millis(poll_interval_ms));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut stats_log_tick = interval(stats_log_interval);
            stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            let mut last_no_receivers_log: Option<Instant> = None;
            let mut last_overall: Option<OverallHealth> = None;
            let mut last_alerts: Vec<Alert> = Vec::new();

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let snapshot = poll_once(&registry, &aggregator, &sysinfo_repo, &thresholds).await;
                        polls_total.fetch_add(1, Ordering::Relaxed);
                        log_changes(&snapshot, &mut last_overall, &mut last_alerts);

                        history.push(MetricsSample::from_poll(
                            snapshot.timestamp,
                            &snapshot.metrics,
                            &snapshot.fleet,
                        ));

                        if tx.send(snapshot).is_err() {
                            let should_log = last_no_receivers_log
                                .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_LOG_INTERVAL);
                            if should_log {
                                tracing::debug!(
                                    operation = "broadcast_snapshot",
                                    "No active WebSocket clients; broadcast channel has no receivers"
                                );
                                last_no_receivers_log = Some(Instant::now());
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Worker shutting down");
                        break;
                    }
                    _ = stats_log_tick.tick() => {
                        tracing::info!(
                            ws_health_clients = ws_health_connections.load(Ordering::Relaxed),
                            polls_total = polls_total.load(Ordering::Relaxed),
                            history_len = history.len(),
                            last_overall = ?last_overall,
                            "app stats"
                        );
                    }
                }
            }
        }
        .instrument(worker_span),
    )
}

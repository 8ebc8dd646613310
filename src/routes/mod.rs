// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::FleetHealthAggregator;
use crate::history::MetricsHistory;
use crate::models::{AlertThresholds, HealthSnapshot};
use crate::registry::ServiceRegistry;
use crate::sysinfo_repo::SysinfoRepo;

/// Everything the route layer reads from; built once in `main` (or a test).
pub struct RouteDeps {
    pub registry: ServiceRegistry,
    pub aggregator: Arc<FleetHealthAggregator>,
    pub sysinfo_repo: Arc<SysinfoRepo>,
    pub history: Arc<MetricsHistory>,
    pub thresholds: AlertThresholds,
    pub health_tx: broadcast::Sender<HealthSnapshot>,
    pub ws_health_connections: Arc<AtomicUsize>,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) registry: ServiceRegistry,
    pub(crate) aggregator: Arc<FleetHealthAggregator>,
    pub(crate) sysinfo_repo: Arc<SysinfoRepo>,
    pub(crate) history: Arc<MetricsHistory>,
    pub(crate) thresholds: Arc<AlertThresholds>,
    pub(crate) health_tx: broadcast::Sender<HealthSnapshot>,
    pub(crate) ws_health_connections: Arc<AtomicUsize>,
}

pub fn app(deps: RouteDeps) -> Router {
    let state = AppState {
        registry: deps.registry,
        aggregator: deps.aggregator,
        sysinfo_repo: deps.sysinfo_repo,
        history: deps.history,
        thresholds: Arc::new(deps.thresholds),
        health_tx: deps.health_tx,
        ws_health_connections: deps.ws_health_connections,
    };
    Router::new()
        .route("/", get(|| async { "servicewatch: fleet health monitor" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/overview", get(http::overview_handler)) // GET /api/overview
        .route("/api/services", get(http::services_handler)) // GET /api/services
        .route("/api/services/{name}", get(http::service_detail_handler)) // GET /api/services/{name}
        .route(
            "/api/services/{name}/restart",
            post(http::service_restart_handler),
        ) // POST /api/services/{name}/restart
        .route(
            "/api/services/{name}/start",
            post(http::service_start_handler),
        ) // POST /api/services/{name}/start
        .route(
            "/api/services/{name}/stop",
            post(http::service_stop_handler),
        ) // POST /api/services/{name}/stop
        .route(
            "/api/services/{name}/logs",
            get(http::service_logs_handler),
        ) // GET /api/services/{name}/logs
        .route("/api/alerts", get(http::alerts_handler)) // GET /api/alerts
        .route("/api/history", get(http::history_handler)) // GET /api/history
        .route("/ws/health", get(ws::ws_health)) // WS /ws/health
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

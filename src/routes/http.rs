// HTTP handlers: version, overview, services, alerts, history

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::error::HealthError;
use crate::models::now_ms;
use crate::version::{NAME, VERSION};
use crate::worker::poll_once;

const DEFAULT_HISTORY_LIMIT: usize = 60;
const DEFAULT_LOG_LINES: usize = 100;
const MAX_LOG_LINES: usize = 5000;

/// JSON error body `{ "error": ... }` with a status derived from the fault.
pub(super) struct ApiError(StatusCode, String);

impl From<HealthError> for ApiError {
    fn from(e: HealthError) -> Self {
        let status = match &e {
            HealthError::ContainerNotFound(_) => StatusCode::NOT_FOUND,
            HealthError::RuntimeUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HealthError::ProbeFailed(_) => StatusCode::BAD_GATEWAY,
            HealthError::ConfigurationInvalid(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

fn service_not_found() -> ApiError {
    ApiError(StatusCode::NOT_FOUND, "Service not found".into())
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/overview: fleet health, host metrics and current alerts from a fresh poll.
pub(super) async fn overview_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = poll_once(
        &state.registry,
        &state.aggregator,
        &state.sysinfo_repo,
        &state.thresholds,
    )
    .await;
    Json(json!({
        "systemHealth": snapshot.fleet,
        "systemInfo": snapshot.metrics,
        "alerts": snapshot.alerts,
        "timestamp": snapshot.timestamp,
    }))
}

/// GET /api/services: every service report plus per-status counts.
pub(super) async fn services_handler(State(state): State<AppState>) -> impl IntoResponse {
    let fleet = state.aggregator.aggregate(&state.registry).await;
    let summary = fleet.summary();
    Json(json!({
        "services": fleet.services,
        "summary": summary,
        "timestamp": fleet.generated_at,
    }))
}

/// GET /api/services/{name}: one service, matched case-insensitively.
pub(super) async fn service_detail_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let descriptor = state.registry.get(&name).ok_or_else(service_not_found)?;
    let report = state.aggregator.evaluate_one(descriptor).await;
    Ok(Json(report))
}

#[derive(Debug, Clone, Copy)]
enum ContainerAction {
    Start,
    Stop,
    Restart,
}

impl ContainerAction {
    fn verb(self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Restart => "restart",
        }
    }
}

fn no_backing_container() -> ApiError {
    ApiError(
        StatusCode::NOT_FOUND,
        "Service has no backing container".into(),
    )
}

/// Resolve the service's backing container with the usual matching rule and apply `action`.
async fn container_action(
    state: &AppState,
    name: &str,
    action: ContainerAction,
) -> Result<Json<serde_json::Value>, ApiError> {
    let descriptor = state.registry.get(name).ok_or_else(service_not_found)?;
    let container_name = descriptor
        .container_name
        .as_deref()
        .ok_or_else(no_backing_container)?;
    let containers = state.aggregator.evaluator().containers();
    let container = containers.find(container_name).await?;
    let runtime = containers.runtime();
    match action {
        ContainerAction::Start => runtime.start_container(&container.id).await?,
        ContainerAction::Stop => runtime.stop_container(&container.id).await?,
        ContainerAction::Restart => runtime.restart_container(&container.id).await?,
    }
    tracing::info!(
        service = %descriptor.name,
        container = %container.id,
        action = action.verb(),
        "container action initiated"
    );
    Ok(Json(json!({
        "message": format!("Service {} {} initiated", descriptor.name, action.verb()),
        "containerId": container.id,
    })))
}

/// POST /api/services/{name}/restart
pub(super) async fn service_restart_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    container_action(&state, &name, ContainerAction::Restart).await
}

/// POST /api/services/{name}/start
pub(super) async fn service_start_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    container_action(&state, &name, ContainerAction::Start).await
}

/// POST /api/services/{name}/stop
pub(super) async fn service_stop_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    container_action(&state, &name, ContainerAction::Stop).await
}

#[derive(Debug, Deserialize)]
pub(super) struct LogsQuery {
    lines: Option<usize>,
}

/// GET /api/services/{name}/logs?lines=N: last N timestamped log lines of the backing container.
pub(super) async fn service_logs_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let descriptor = state.registry.get(&name).ok_or_else(service_not_found)?;
    let container_name = descriptor
        .container_name
        .as_deref()
        .ok_or_else(no_backing_container)?;
    let lines = query.lines.unwrap_or(DEFAULT_LOG_LINES).min(MAX_LOG_LINES);
    let containers = state.aggregator.evaluator().containers();
    let container = containers.find(container_name).await?;
    let logs = containers
        .runtime()
        .container_logs(&container.id, lines)
        .await?;
    Ok(Json(json!({
        "service": descriptor.name,
        "containerId": container.id,
        "logs": logs,
        "lines": lines,
    })))
}

/// GET /api/alerts: threshold alerts from a fresh poll.
pub(super) async fn alerts_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = poll_once(
        &state.registry,
        &state.aggregator,
        &state.sysinfo_repo,
        &state.thresholds,
    )
    .await;
    Json(json!({
        "alerts": snapshot.alerts,
        "timestamp": snapshot.timestamp,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    limit: Option<usize>,
}

/// GET /api/history?limit=N: most recent samples, oldest first.
pub(super) async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(state.history.capacity());
    Json(json!({
        "samples": state.history.recent(limit),
        "capacity": state.history.capacity(),
        "timestamp": now_ms(),
    }))
}

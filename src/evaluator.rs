// Per-service health evaluation: container state first, then the optional HTTP probe

use crate::container_state::ContainerStateProvider;
use crate::models::{
    ContainerState, ProbeResult, ServiceDescriptor, ServiceHealthReport, ServiceStatus, now_ms,
};
use crate::probe::Prober;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Combines container state and probe outcome into one verdict. Precedence:
///
/// 1. runtime lookup failure → `error`
/// 2. container missing or not running → `stopped` (probe skipped)
/// 3. no health endpoint → `healthy`
/// 4. probe answered 200 → `healthy`; any other answer or a failed probe → `degraded`
///
/// Services without a container name skip step 1-2 and count as running.
pub struct ServiceHealthEvaluator {
    containers: Arc<ContainerStateProvider>,
    prober: Arc<dyn Prober>,
    probe_timeout: Duration,
}

impl ServiceHealthEvaluator {
    pub fn new(
        containers: Arc<ContainerStateProvider>,
        prober: Arc<dyn Prober>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            containers,
            prober,
            probe_timeout,
        }
    }

    pub fn containers(&self) -> &Arc<ContainerStateProvider> {
        &self.containers
    }

    #[instrument(skip(self, descriptor), fields(service = %descriptor.name))]
    pub async fn evaluate(&self, descriptor: &ServiceDescriptor) -> ServiceHealthReport {
        let checked_at = now_ms();

        let container = match &descriptor.container_name {
            None => None,
            Some(container_name) => match self.containers.lookup(container_name).await {
                Ok(Some(c)) => Some(c),
                Ok(None) => {
                    return stopped(
                        descriptor,
                        ContainerState::NotFound,
                        format!("container {} not found", container_name),
                        checked_at,
                    );
                }
                Err(e) => {
                    debug!(error = %e, "container lookup failed");
                    return ServiceHealthReport::error(&descriptor.name, e.to_string(), checked_at);
                }
            },
        };

        if let Some(c) = &container {
            let state = ContainerState::from_docker(&c.state);
            if !state.is_running() {
                let detail = if c.state.is_empty() {
                    "unknown".to_string()
                } else {
                    c.state.clone()
                };
                return stopped(
                    descriptor,
                    state,
                    format!("container not running ({})", detail),
                    checked_at,
                );
            }
        }

        let stats = async {
            match &container {
                Some(c) => self.containers.stats_for(c).await,
                None => None,
            }
        };
        let probe = async {
            match &descriptor.health_endpoint {
                Some(endpoint) => {
                    self.prober
                        .probe(endpoint, descriptor.skip_tls_verify, self.probe_timeout)
                        .await
                }
                None => ProbeResult::Skipped,
            }
        };
        let (resource_usage, probe_result) = tokio::join!(stats, probe);

        let (status, reason) = match &probe_result {
            ProbeResult::Ok {
                http_status: 200, ..
            } => (ServiceStatus::Healthy, None),
            ProbeResult::Ok { http_status, .. } => (
                ServiceStatus::Degraded,
                Some(format!("health check returned HTTP {}", http_status)),
            ),
            ProbeResult::Failed { reason } => (
                ServiceStatus::Degraded,
                Some(format!("health check failed: {}", reason)),
            ),
            ProbeResult::Skipped => (
                ServiceStatus::Healthy,
                Some("container running (no health endpoint)".to_string()),
            ),
        };

        ServiceHealthReport {
            name: descriptor.name.clone(),
            status,
            container_state: ContainerState::Running,
            probe_result: Some(probe_result),
            resource_usage,
            reason,
            checked_at,
        }
    }
}

fn stopped(
    descriptor: &ServiceDescriptor,
    container_state: ContainerState,
    reason: String,
    checked_at: u64,
) -> ServiceHealthReport {
    ServiceHealthReport {
        name: descriptor.name.clone(),
        status: ServiceStatus::Stopped,
        container_state,
        probe_result: Some(ProbeResult::Skipped),
        resource_usage: None,
        reason: Some(reason),
        checked_at,
    }
}

// Container state lookup and resource usage derivation on top of a ContainerRuntime

use crate::error::HealthError;
use crate::models::{ContainerState, ResourceUsage};
use crate::runtime::{ContainerRuntime, ContainerSummary, StatsSample};
use std::sync::Arc;
use tracing::debug;

/// Pick the container for `wanted`: a container with an exactly equal name wins; otherwise the
/// first container (in runtime list order) with a name containing `wanted`.
pub fn match_container<'a>(
    containers: &'a [ContainerSummary],
    wanted: &str,
) -> Option<&'a ContainerSummary> {
    containers
        .iter()
        .find(|c| c.names.iter().any(|n| n == wanted))
        .or_else(|| {
            containers
                .iter()
                .find(|c| c.names.iter().any(|n| n.contains(wanted)))
        })
}

/// CPU and memory percentages from one stats sample. Zero deltas or a zero memory limit give 0%
/// instead of NaN or infinity; counter resets (current < previous) count as no usage.
pub fn derive_usage(sample: &StatsSample) -> ResourceUsage {
    let cpu_delta = sample
        .cpu_total_usage
        .saturating_sub(sample.precpu_total_usage) as f64;
    let system_delta = sample
        .system_cpu_usage
        .saturating_sub(sample.presystem_cpu_usage) as f64;
    let online = sample.online_cpus.max(1) as f64;
    let cpu_percent = if system_delta > 0.0 {
        (cpu_delta / system_delta) * 100.0 * online
    } else {
        0.0
    };

    let mem_percent = if sample.mem_limit > 0 {
        (sample.mem_usage as f64 / sample.mem_limit as f64) * 100.0
    } else {
        0.0
    };

    ResourceUsage {
        cpu_percent,
        mem_used_bytes: sample.mem_usage,
        mem_limit_bytes: sample.mem_limit,
        mem_percent,
    }
}

pub struct ContainerStateProvider {
    runtime: Arc<dyn ContainerRuntime>,
}

impl ContainerStateProvider {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &Arc<dyn ContainerRuntime> {
        &self.runtime
    }

    /// The matching container, `Ok(None)` when nothing matches.
    pub async fn lookup(&self, container_name: &str) -> Result<Option<ContainerSummary>, HealthError> {
        let containers = self.runtime.list_containers().await?;
        Ok(match_container(&containers, container_name).cloned())
    }

    /// Like [`lookup`](Self::lookup) but a miss is an error; used by operator actions.
    pub async fn find(&self, container_name: &str) -> Result<ContainerSummary, HealthError> {
        self.lookup(container_name)
            .await?
            .ok_or_else(|| HealthError::ContainerNotFound(container_name.to_string()))
    }

    /// Never fails: an unreachable runtime is reported as [`ContainerState::Error`].
    pub async fn get_state(&self, container_name: &str) -> ContainerState {
        match self.lookup(container_name).await {
            Ok(Some(c)) => ContainerState::from_docker(&c.state),
            Ok(None) => ContainerState::NotFound,
            Err(e) => {
                debug!(container = container_name, error = %e, "container state lookup failed");
                ContainerState::Error
            }
        }
    }

    /// Usage for a running container; `None` if it is not running or stats are unavailable.
    pub async fn get_stats(&self, container_name: &str) -> Option<ResourceUsage> {
        let container = self.lookup(container_name).await.ok().flatten()?;
        if !ContainerState::from_docker(&container.state).is_running() {
            return None;
        }
        self.stats_for(&container).await
    }

    /// Usage for an already resolved container.
    pub async fn stats_for(&self, container: &ContainerSummary) -> Option<ResourceUsage> {
        match self.runtime.container_stats(&container.id).await {
            Ok(Some(sample)) => Some(derive_usage(&sample)),
            Ok(None) => None,
            Err(e) => {
                debug!(container = %container.id, error = %e, "container stats unavailable");
                None
            }
        }
    }
}

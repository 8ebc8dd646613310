// Docker container runtime via bollard

mod stats;

use crate::error::HealthError;
use crate::runtime::{ContainerRuntime, ContainerSummary, StatsSample, log_lines};
use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::{
    ListContainersOptions, LogsOptions, RestartContainerOptions, StartContainerOptions,
    StatsOptions, StopContainerOptions,
};
use futures_util::StreamExt;
use std::time::Duration;
use tracing::{instrument, warn};

/// Docker-backed [`ContainerRuntime`]. The client is cheap to clone and holds no mutable state,
/// so one instance is shared by every concurrent evaluation.
pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    /// Connect using the local socket defaults; every request is bounded by `timeout`.
    pub fn connect(timeout: Duration) -> anyhow::Result<Self> {
        let docker = Docker::connect_with_local_defaults()?.with_timeout(timeout);
        Ok(Self { docker })
    }
}

fn map_err(id: &str, e: bollard::errors::Error) -> HealthError {
    match e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => HealthError::ContainerNotFound(id.to_string()),
        other => HealthError::RuntimeUnavailable(other.to_string()),
    }
}

#[async_trait]
impl ContainerRuntime for DockerRepo {
    #[instrument(skip(self), fields(repo = "docker", operation = "list_containers"))]
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, HealthError> {
        let options = ListContainersOptions {
            all: true,
            ..Default::default()
        };
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| {
                warn!(error = %e, "Docker list_containers failed");
                HealthError::RuntimeUnavailable(e.to_string())
            })?;

        Ok(containers
            .into_iter()
            .map(|c| {
                let id = c.id.unwrap_or_default();
                let names = c
                    .names
                    .unwrap_or_default()
                    .into_iter()
                    .map(|n| n.trim_start_matches('/').to_string())
                    .collect();
                let state = c.state.map(|s| s.to_string()).unwrap_or_default();
                ContainerSummary { id, names, state }
            })
            .collect())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "container_stats"))]
    async fn container_stats(&self, id: &str) -> Result<Option<StatsSample>, HealthError> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        match stream.next().await {
            Some(Ok(s)) => Ok(stats::to_sample(&s)),
            Some(Err(e)) => Err(map_err(id, e)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "start_container"))]
    async fn start_container(&self, id: &str) -> Result<(), HealthError> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await
            .map_err(|e| map_err(id, e))
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "stop_container"))]
    async fn stop_container(&self, id: &str) -> Result<(), HealthError> {
        self.docker
            .stop_container(id, None::<StopContainerOptions>)
            .await
            .map_err(|e| map_err(id, e))
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "restart_container"))]
    async fn restart_container(&self, id: &str) -> Result<(), HealthError> {
        self.docker
            .restart_container(id, None::<RestartContainerOptions>)
            .await
            .map_err(|e| map_err(id, e))
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "container_logs"))]
    async fn container_logs(&self, id: &str, tail: usize) -> Result<Vec<String>, HealthError> {
        let options = LogsOptions {
            stdout: true,
            stderr: true,
            timestamps: true,
            tail: tail.to_string(),
            ..Default::default()
        };
        let mut stream = self.docker.logs(id, Some(options));
        // Frames can split lines when the container has a TTY, so join before splitting.
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| map_err(id, e))?;
            text.push_str(&chunk.to_string());
        }
        Ok(log_lines(&text))
    }
}

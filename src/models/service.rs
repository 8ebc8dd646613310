// Per-service models: descriptor, container state, probe outcome, health report

use serde::{Deserialize, Serialize};

/// Static description of one monitored service; immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    pub name: String,
    /// Container to look up in the runtime. `None` for services with no backing container,
    /// which are treated as implicitly running.
    pub container_name: Option<String>,
    pub health_endpoint: Option<String>,
    #[serde(default)]
    pub skip_tls_verify: bool,
}

/// Lifecycle state of the backing container, collapsed to what the health path cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerState {
    Running,
    Stopped,
    NotFound,
    Error,
}

impl ContainerState {
    /// Map a Docker lifecycle string ("running", "exited", "paused", ...) to a state.
    /// Anything other than running counts as stopped.
    pub fn from_docker(s: &str) -> Self {
        if s.eq_ignore_ascii_case("running") {
            ContainerState::Running
        } else {
            ContainerState::Stopped
        }
    }

    pub fn is_running(self) -> bool {
        self == ContainerState::Running
    }
}

/// CPU/memory usage derived from one stats sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub mem_used_bytes: u64,
    pub mem_limit_bytes: u64,
    pub mem_percent: f64,
}

/// Outcome of a single HTTP health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "outcome",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum ProbeResult {
    Ok { http_status: u16, latency_ms: u64 },
    Failed { reason: String },
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Stopped,
    Error,
}

/// Verdict for one service from one poll. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealthReport {
    pub name: String,
    pub status: ServiceStatus,
    pub container_state: ContainerState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_result: Option<ProbeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_usage: Option<ResourceUsage>,
    /// Diagnostic text for non-healthy verdicts (or a note on how "healthy" was decided).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Epoch milliseconds.
    pub checked_at: u64,
}

impl ServiceHealthReport {
    /// Report for an evaluation that could not complete.
    pub fn error(name: impl Into<String>, reason: impl Into<String>, checked_at: u64) -> Self {
        Self {
            name: name.into(),
            status: ServiceStatus::Error,
            container_state: ContainerState::Error,
            probe_result: None,
            resource_usage: None,
            reason: Some(reason.into()),
            checked_at,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_docker_maps_only_running_to_running() {
        assert_eq!(ContainerState::from_docker("running"), ContainerState::Running);
        assert_eq!(ContainerState::from_docker("Running"), ContainerState::Running);
        for s in ["exited", "paused", "restarting", "created", "dead", "removing", ""] {
            assert_eq!(ContainerState::from_docker(s), ContainerState::Stopped, "{s}");
        }
    }

    #[test]
    fn container_state_serializes_kebab_case() {
        let json = serde_json::to_string(&ContainerState::NotFound).unwrap();
        assert_eq!(json, "\"not-found\"");
    }

    #[test]
    fn probe_result_is_tagged_with_camel_case_fields() {
        let ok = ProbeResult::Ok {
            http_status: 200,
            latency_ms: 12,
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["outcome"], "ok");
        assert_eq!(json["httpStatus"], 200);
        assert_eq!(json["latencyMs"], 12);

        let skipped = serde_json::to_value(ProbeResult::Skipped).unwrap();
        assert_eq!(skipped["outcome"], "skipped");
    }
}

// Container runtime capability consumed by the health path and operator routes

use async_trait::async_trait;

use crate::error::HealthError;

/// One entry from the runtime's container list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    /// Container names with any leading '/' already stripped.
    pub names: Vec<String>,
    /// Raw lifecycle string as reported by the runtime (e.g. "running", "exited").
    pub state: String,
}

/// Raw counters from a single non-streaming stats call. `pre*` fields are the runtime's previous
/// sample, so deltas come from one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSample {
    pub cpu_total_usage: u64,
    pub precpu_total_usage: u64,
    pub system_cpu_usage: u64,
    pub presystem_cpu_usage: u64,
    pub online_cpus: u32,
    pub mem_usage: u64,
    pub mem_limit: u64,
}

/// Read-mostly view of the container runtime. Shared across concurrent evaluations, so
/// implementations must be safe to call from many tasks at once.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Every container, including stopped ones.
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, HealthError>;

    /// `Ok(None)` when the runtime returned no usable sample.
    async fn container_stats(&self, id: &str) -> Result<Option<StatsSample>, HealthError>;

    async fn start_container(&self, id: &str) -> Result<(), HealthError>;

    async fn stop_container(&self, id: &str) -> Result<(), HealthError>;

    async fn restart_container(&self, id: &str) -> Result<(), HealthError>;

    /// The last `tail` log lines (stdout and stderr, timestamped), oldest first.
    async fn container_logs(&self, id: &str, tail: usize) -> Result<Vec<String>, HealthError>;
}

/// Split raw log output into non-blank lines, dropping trailing `\r`.
pub fn log_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lines_drops_blank_lines() {
        let text = "2024-01-01T00:00:00Z started\r\n\n  \n2024-01-01T00:00:01Z ready\n";
        assert_eq!(
            log_lines(text),
            ["2024-01-01T00:00:00Z started", "2024-01-01T00:00:01Z ready"]
        );
        assert!(log_lines("").is_empty());
    }
}

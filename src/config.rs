use crate::models::{AlertThresholds, Threshold};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub monitoring: MonitoringConfig,
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub alerts: AlertThresholds,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Time between fleet polls.
    pub poll_interval_ms: u64,
    /// Hard timeout for one HTTP health probe.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Cap on one service evaluation (container lookup, then stats and probe together). Must
    /// exceed the worst case of the inner timeouts so a hung probe still reports `degraded`, and
    /// stay below the poll interval so runs never pile up.
    #[serde(default = "default_evaluation_timeout_ms")]
    pub evaluation_timeout_ms: u64,
    /// Per-request timeout of the Docker client.
    #[serde(default = "default_runtime_timeout_secs")]
    pub runtime_timeout_secs: u64,
    /// How often to log app stats (ws clients, polls, history size) at INFO level.
    pub stats_log_interval_secs: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_history_max_age_secs")]
    pub history_max_age_secs: u64,
}

fn default_probe_timeout_ms() -> u64 {
    crate::probe::DEFAULT_PROBE_TIMEOUT.as_millis() as u64
}

fn default_evaluation_timeout_ms() -> u64 {
    20_000
}

fn default_runtime_timeout_secs() -> u64 {
    5
}

fn default_history_capacity() -> usize {
    720
}

fn default_history_max_age_secs() -> u64 {
    3600
}

impl MonitoringConfig {
    /// Longest an evaluation can take when every inner call runs to its own timeout: one runtime
    /// lookup, then stats and probe concurrently.
    pub fn worst_case_evaluation_ms(&self) -> u64 {
        let runtime_ms = self.runtime_timeout_secs.saturating_mul(1000);
        runtime_ms.saturating_add(runtime_ms.max(self.probe_timeout_ms))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of health snapshots kept in the broadcast channel for /ws/health (slow clients may lag).
    pub broadcast_capacity: usize,
}

/// One `[[services]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub health_endpoint: Option<String>,
    #[serde(default)]
    pub skip_tls_verify: bool,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        let m = &self.monitoring;
        anyhow::ensure!(
            m.poll_interval_ms > 0,
            "monitoring.poll_interval_ms must be > 0, got {}",
            m.poll_interval_ms
        );
        anyhow::ensure!(
            m.probe_timeout_ms > 0,
            "monitoring.probe_timeout_ms must be > 0, got {}",
            m.probe_timeout_ms
        );
        anyhow::ensure!(
            m.runtime_timeout_secs > 0,
            "monitoring.runtime_timeout_secs must be > 0, got {}",
            m.runtime_timeout_secs
        );
        let worst_case_ms = m.worst_case_evaluation_ms();
        anyhow::ensure!(
            m.evaluation_timeout_ms > worst_case_ms,
            "monitoring.evaluation_timeout_ms must be > {} (runtime lookup plus the slower of probe \
             and stats), got {}",
            worst_case_ms,
            m.evaluation_timeout_ms
        );
        anyhow::ensure!(
            m.evaluation_timeout_ms < m.poll_interval_ms,
            "monitoring.evaluation_timeout_ms must be < poll_interval_ms ({}), got {}",
            m.poll_interval_ms,
            m.evaluation_timeout_ms
        );
        anyhow::ensure!(
            m.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            m.stats_log_interval_secs
        );
        anyhow::ensure!(
            m.history_capacity > 0,
            "monitoring.history_capacity must be > 0, got {}",
            m.history_capacity
        );
        anyhow::ensure!(
            m.history_max_age_secs > 0,
            "monitoring.history_max_age_secs must be > 0, got {}",
            m.history_max_age_secs
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        validate_threshold("alerts.cpu", self.alerts.cpu)?;
        validate_threshold("alerts.memory", self.alerts.memory)?;
        validate_threshold("alerts.disk", self.alerts.disk)?;
        validate_threshold("alerts.unhealthy_services", self.alerts.unhealthy_services)?;
        Ok(())
    }
}

fn validate_threshold(key: &str, t: Threshold) -> anyhow::Result<()> {
    anyhow::ensure!(
        t.warning.is_finite() && t.critical.is_finite() && t.warning >= 0.0,
        "{} thresholds must be finite and non-negative",
        key
    );
    anyhow::ensure!(
        t.warning <= t.critical,
        "{}.warning must be <= critical ({} > {})",
        key,
        t.warning,
        t.critical
    );
    Ok(())
}

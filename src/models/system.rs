// Host metrics, history samples and the per-poll snapshot pushed to WebSocket clients

use serde::{Deserialize, Serialize};

use super::{Alert, FleetHealthReport, OverallHealth};

/// Point-in-time host metrics; the alert evaluator reads the percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub hostname: String,
    pub uptime_secs: u64,
    pub load_average: [f64; 3],
    pub cpu_percent: f64,
    pub memory_total: u64,
    pub memory_used: u64,
    pub memory_percent: f64,
    pub disk_total: u64,
    pub disk_used: u64,
    pub disk_percent: f64,
}

/// One entry in the in-memory metrics history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSample {
    /// Epoch milliseconds.
    pub timestamp: u64,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub healthy_count: usize,
    pub total_count: usize,
    pub overall: OverallHealth,
}

impl MetricsSample {
    pub fn from_poll(timestamp: u64, metrics: &SystemMetrics, fleet: &FleetHealthReport) -> Self {
        Self {
            timestamp,
            cpu_percent: metrics.cpu_percent,
            memory_percent: metrics.memory_percent,
            disk_percent: metrics.disk_percent,
            healthy_count: fleet.healthy_count,
            total_count: fleet.total_count,
            overall: fleet.overall,
        }
    }
}

/// Everything one worker tick produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub timestamp: u64,
    pub fleet: FleetHealthReport,
    pub metrics: SystemMetrics,
    pub alerts: Vec<Alert>,
}

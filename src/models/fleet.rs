// Fleet-wide rollup models

use serde::{Deserialize, Serialize};

use super::{ServiceHealthReport, ServiceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    Healthy,
    Degraded,
    Critical,
}

impl OverallHealth {
    /// All healthy → healthy; strict majority healthy → degraded; otherwise critical.
    /// Exactly half healthy is critical.
    pub fn from_counts(healthy: usize, total: usize) -> Self {
        if healthy == total {
            OverallHealth::Healthy
        } else if healthy * 2 > total {
            OverallHealth::Degraded
        } else {
            OverallHealth::Critical
        }
    }
}

/// Result of one poll over the whole registry, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetHealthReport {
    pub overall: OverallHealth,
    pub healthy_count: usize,
    pub total_count: usize,
    pub services: Vec<ServiceHealthReport>,
    /// Epoch milliseconds.
    pub generated_at: u64,
}

impl FleetHealthReport {
    /// Roll per-service reports (already in registry order) into a fleet report.
    pub fn from_services(services: Vec<ServiceHealthReport>, generated_at: u64) -> Self {
        let healthy_count = services.iter().filter(|s| s.is_healthy()).count();
        let total_count = services.len();
        Self {
            overall: OverallHealth::from_counts(healthy_count, total_count),
            healthy_count,
            total_count,
            services,
            generated_at,
        }
    }

    pub fn unhealthy_count(&self) -> usize {
        self.total_count - self.healthy_count
    }

    pub fn summary(&self) -> FleetSummary {
        let count = |status: ServiceStatus| self.services.iter().filter(|s| s.status == status).count();
        let percentage = if self.total_count > 0 {
            ((self.healthy_count as f64 / self.total_count as f64) * 100.0).round() as u32
        } else {
            0
        };
        FleetSummary {
            total: self.total_count,
            healthy: self.healthy_count,
            degraded: count(ServiceStatus::Degraded),
            stopped: count(ServiceStatus::Stopped),
            error: count(ServiceStatus::Error),
            percentage,
        }
    }
}

/// Per-status counts for the services listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub stopped: usize,
    pub error: usize,
    pub percentage: u32,
}

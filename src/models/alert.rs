// Alert records and threshold configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertDimension {
    Cpu,
    Memory,
    Disk,
    UnhealthyServices,
}

impl AlertDimension {
    pub fn label(self) -> &'static str {
        match self {
            AlertDimension::Cpu => "CPU usage",
            AlertDimension::Memory => "Memory usage",
            AlertDimension::Disk => "Disk usage",
            AlertDimension::UnhealthyServices => "Unhealthy services",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub dimension: AlertDimension,
    pub level: AlertLevel,
    pub message: String,
    pub value: f64,
    /// The threshold that was crossed (the critical one when both are).
    pub threshold: f64,
}

/// Warning/critical pair for one dimension; a value at or above a threshold crosses it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub warning: f64,
    pub critical: f64,
}

impl Threshold {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    #[serde(default = "default_cpu")]
    pub cpu: Threshold,
    #[serde(default = "default_memory")]
    pub memory: Threshold,
    #[serde(default = "default_disk")]
    pub disk: Threshold,
    /// Count of services whose status is not healthy.
    #[serde(default = "default_unhealthy_services")]
    pub unhealthy_services: Threshold,
}

fn default_cpu() -> Threshold {
    Threshold::new(70.0, 90.0)
}

fn default_memory() -> Threshold {
    Threshold::new(80.0, 95.0)
}

fn default_disk() -> Threshold {
    Threshold::new(80.0, 90.0)
}

fn default_unhealthy_services() -> Threshold {
    Threshold::new(1.0, 3.0)
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu: default_cpu(),
            memory: default_memory(),
            disk: default_disk(),
            unhealthy_services: default_unhealthy_services(),
        }
    }
}

impl AlertThresholds {
    pub fn for_dimension(&self, dimension: AlertDimension) -> Threshold {
        match dimension {
            AlertDimension::Cpu => self.cpu,
            AlertDimension::Memory => self.memory,
            AlertDimension::Disk => self.disk,
            AlertDimension::UnhealthyServices => self.unhealthy_services,
        }
    }
}

// Domain models: service descriptors, per-service and fleet reports, alerts, host metrics

mod alert;
mod fleet;
mod service;
mod system;

pub use alert::{Alert, AlertDimension, AlertLevel, AlertThresholds, Threshold};
pub use fleet::{FleetHealthReport, FleetSummary, OverallHealth};
pub use service::{
    ContainerState, ProbeResult, ResourceUsage, ServiceDescriptor, ServiceHealthReport,
    ServiceStatus,
};
pub use system::{HealthSnapshot, MetricsSample, SystemMetrics};

/// Current wall-clock time as epoch milliseconds; 0 if the clock is before the epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}

// Threshold alerts over host metrics and fleet health

use crate::models::{
    Alert, AlertDimension, AlertLevel, AlertThresholds, FleetHealthReport, SystemMetrics,
    Threshold,
};

/// Evaluation order of the monitored dimensions; alerts come out in this order.
const DIMENSIONS: [AlertDimension; 4] = [
    AlertDimension::Cpu,
    AlertDimension::Memory,
    AlertDimension::Disk,
    AlertDimension::UnhealthyServices,
];

/// At most one alert per dimension; critical wins over warning. Empty when nothing crosses.
pub fn evaluate(
    metrics: &SystemMetrics,
    fleet: &FleetHealthReport,
    thresholds: &AlertThresholds,
) -> Vec<Alert> {
    DIMENSIONS
        .iter()
        .filter_map(|&dimension| {
            let value = match dimension {
                AlertDimension::Cpu => metrics.cpu_percent,
                AlertDimension::Memory => metrics.memory_percent,
                AlertDimension::Disk => metrics.disk_percent,
                AlertDimension::UnhealthyServices => fleet.unhealthy_count() as f64,
            };
            check(dimension, value, thresholds.for_dimension(dimension))
        })
        .collect()
}

fn check(dimension: AlertDimension, value: f64, threshold: Threshold) -> Option<Alert> {
    let (level, crossed) = if value >= threshold.critical {
        (AlertLevel::Critical, threshold.critical)
    } else if value >= threshold.warning {
        (AlertLevel::Warning, threshold.warning)
    } else {
        return None;
    };
    let message = match dimension {
        AlertDimension::UnhealthyServices => format!(
            "{} service(s) not healthy (threshold {})",
            value as u64, crossed as u64
        ),
        _ => format!(
            "{} at {:.1}% (threshold {:.0}%)",
            dimension.label(),
            value,
            crossed
        ),
    };
    Some(Alert {
        dimension,
        level,
        message,
        value,
        threshold: crossed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContainerState, ServiceHealthReport, ServiceStatus};

    fn fleet(statuses: &[ServiceStatus]) -> FleetHealthReport {
        let services = statuses
            .iter()
            .enumerate()
            .map(|(i, &status)| ServiceHealthReport {
                name: format!("svc{}", i),
                status,
                container_state: ContainerState::Running,
                probe_result: None,
                resource_usage: None,
                reason: None,
                checked_at: 0,
            })
            .collect();
        FleetHealthReport::from_services(services, 0)
    }

    fn metrics(cpu: f64, memory: f64, disk: f64) -> SystemMetrics {
        SystemMetrics {
            cpu_percent: cpu,
            memory_percent: memory,
            disk_percent: disk,
            ..Default::default()
        }
    }

    #[test]
    fn nothing_crossed_yields_no_alerts() {
        let alerts = evaluate(
            &metrics(10.0, 20.0, 30.0),
            &fleet(&[ServiceStatus::Healthy]),
            &AlertThresholds::default(),
        );
        assert!(alerts.is_empty());
    }

    #[test]
    fn cpu_above_critical_emits_single_critical_alert() {
        let alerts = evaluate(
            &metrics(95.0, 0.0, 0.0),
            &fleet(&[]),
            &AlertThresholds::default(),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].dimension, AlertDimension::Cpu);
        assert_eq!(alerts[0].level, AlertLevel::Critical);
        assert_eq!(alerts[0].threshold, 90.0);
        assert_eq!(alerts[0].value, 95.0);
    }

    #[test]
    fn between_thresholds_is_warning() {
        let alerts = evaluate(
            &metrics(0.0, 85.0, 0.0),
            &fleet(&[]),
            &AlertThresholds::default(),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].dimension, AlertDimension::Memory);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
        assert_eq!(alerts[0].threshold, 80.0);
    }

    #[test]
    fn unhealthy_service_count_uses_non_healthy_statuses() {
        let one = evaluate(
            &metrics(0.0, 0.0, 0.0),
            &fleet(&[ServiceStatus::Healthy, ServiceStatus::Degraded]),
            &AlertThresholds::default(),
        );
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].dimension, AlertDimension::UnhealthyServices);
        assert_eq!(one[0].level, AlertLevel::Warning);

        let three = evaluate(
            &metrics(0.0, 0.0, 0.0),
            &fleet(&[
                ServiceStatus::Stopped,
                ServiceStatus::Error,
                ServiceStatus::Degraded,
            ]),
            &AlertThresholds::default(),
        );
        assert_eq!(three[0].level, AlertLevel::Critical);
        assert_eq!(three[0].value, 3.0);
    }

    #[test]
    fn alerts_follow_dimension_order() {
        let alerts = evaluate(
            &metrics(75.0, 96.0, 91.0),
            &fleet(&[ServiceStatus::Stopped]),
            &AlertThresholds::default(),
        );
        let dims: Vec<_> = alerts.iter().map(|a| a.dimension).collect();
        assert_eq!(
            dims,
            [
                AlertDimension::Cpu,
                AlertDimension::Memory,
                AlertDimension::Disk,
                AlertDimension::UnhealthyServices
            ]
        );
        assert_eq!(alerts[0].level, AlertLevel::Warning);
        assert_eq!(alerts[1].level, AlertLevel::Critical);
        assert_eq!(alerts[2].level, AlertLevel::Critical);
    }
}

// Concurrent fan-out of service evaluations and fleet rollup

use crate::evaluator::ServiceHealthEvaluator;
use crate::models::{FleetHealthReport, ServiceDescriptor, ServiceHealthReport, now_ms};
use crate::registry::ServiceRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, instrument, warn};

/// Runs one evaluation task per registry entry. A task that panics, is cancelled or exceeds the
/// evaluation timeout becomes an `error` report in its own slot; siblings are unaffected.
pub struct FleetHealthAggregator {
    evaluator: Arc<ServiceHealthEvaluator>,
    evaluation_timeout: Duration,
}

impl FleetHealthAggregator {
    pub fn new(evaluator: Arc<ServiceHealthEvaluator>, evaluation_timeout: Duration) -> Self {
        Self {
            evaluator,
            evaluation_timeout,
        }
    }

    pub fn evaluator(&self) -> &Arc<ServiceHealthEvaluator> {
        &self.evaluator
    }

    /// Evaluate every service concurrently; the result keeps registry order. Always succeeds.
    #[instrument(skip(self, registry), fields(operation = "aggregate", services = registry.len()))]
    pub async fn aggregate(&self, registry: &ServiceRegistry) -> FleetHealthReport {
        let descriptors = registry.descriptors();
        let mut set = JoinSet::new();
        let mut slot_by_task = HashMap::with_capacity(descriptors.len());

        for (idx, descriptor) in descriptors.iter().enumerate() {
            let handle = set.spawn(bounded(
                self.evaluator.clone(),
                self.evaluation_timeout,
                descriptor.clone(),
            ));
            slot_by_task.insert(handle.id(), idx);
        }

        let mut slots: Vec<Option<ServiceHealthReport>> = vec![None; descriptors.len()];
        while let Some(joined) = set.join_next_with_id().await {
            match joined {
                Ok((id, report)) => {
                    if let Some(&idx) = slot_by_task.get(&id) {
                        slots[idx] = Some(report);
                    }
                }
                Err(e) => {
                    if let Some(&idx) = slot_by_task.get(&e.id()) {
                        let name = &descriptors[idx].name;
                        warn!(service = %name, error = %e, "service evaluation task failed");
                        slots[idx] = Some(ServiceHealthReport::error(
                            name,
                            task_failure_reason(e),
                            now_ms(),
                        ));
                    }
                }
            }
        }

        let services: Vec<ServiceHealthReport> = slots
            .into_iter()
            .zip(descriptors)
            .map(|(slot, d)| {
                slot.unwrap_or_else(|| {
                    ServiceHealthReport::error(&d.name, "evaluation did not complete", now_ms())
                })
            })
            .collect();

        let report = FleetHealthReport::from_services(services, now_ms());
        debug!(
            overall = ?report.overall,
            healthy = report.healthy_count,
            total = report.total_count,
            "fleet aggregated"
        );
        report
    }

    /// Evaluate a single service with the same timeout and fault isolation as [`aggregate`](Self::aggregate).
    pub async fn evaluate_one(&self, descriptor: &ServiceDescriptor) -> ServiceHealthReport {
        let name = descriptor.name.clone();
        let task = tokio::spawn(bounded(
            self.evaluator.clone(),
            self.evaluation_timeout,
            descriptor.clone(),
        ));
        match task.await {
            Ok(report) => report,
            Err(e) => {
                warn!(service = %name, error = %e, "service evaluation task failed");
                ServiceHealthReport::error(name, task_failure_reason(e), now_ms())
            }
        }
    }
}

/// One evaluation capped at `timeout`; a timeout becomes an `error` report.
async fn bounded(
    evaluator: Arc<ServiceHealthEvaluator>,
    timeout: Duration,
    descriptor: ServiceDescriptor,
) -> ServiceHealthReport {
    match tokio::time::timeout(timeout, evaluator.evaluate(&descriptor)).await {
        Ok(report) => report,
        Err(_) => ServiceHealthReport::error(
            &descriptor.name,
            format!("evaluation timed out after {}ms", timeout.as_millis()),
            now_ms(),
        ),
    }
}

fn task_failure_reason(e: JoinError) -> String {
    if e.is_cancelled() {
        return "evaluation cancelled".to_string();
    }
    let payload = e.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("evaluation panicked: {}", message)
}

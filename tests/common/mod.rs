// Shared test helpers: in-memory runtime and prober fakes

#![allow(dead_code)]

use async_trait::async_trait;
use servicewatch::aggregator::FleetHealthAggregator;
use servicewatch::container_state::ContainerStateProvider;
use servicewatch::error::HealthError;
use servicewatch::evaluator::ServiceHealthEvaluator;
use servicewatch::models::{ProbeResult, ServiceDescriptor};
use servicewatch::probe::Prober;
use servicewatch::runtime::{ContainerRuntime, ContainerSummary, StatsSample};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn container(id: &str, name: &str, state: &str) -> ContainerSummary {
    ContainerSummary {
        id: id.into(),
        names: vec![name.into()],
        state: state.into(),
    }
}

pub fn service(name: &str, container_name: Option<&str>, endpoint: Option<&str>) -> ServiceDescriptor {
    ServiceDescriptor {
        name: name.into(),
        container_name: container_name.map(Into::into),
        health_endpoint: endpoint.map(Into::into),
        skip_tls_verify: false,
    }
}

pub fn sample() -> StatsSample {
    StatsSample {
        cpu_total_usage: 200,
        precpu_total_usage: 100,
        system_cpu_usage: 2000,
        presystem_cpu_usage: 1000,
        online_cpus: 1,
        mem_usage: 50,
        mem_limit: 200,
    }
}

#[derive(Default)]
pub struct FakeRuntime {
    pub containers: Vec<ContainerSummary>,
    pub stats: HashMap<String, StatsSample>,
    /// When set, every list call fails as if the daemon were down.
    pub unavailable: bool,
    /// Added latency for every list call.
    pub list_delay: Duration,
    /// Container ids whose stats call panics.
    pub panic_on_stats: Vec<String>,
    /// Log lines per container id, oldest first.
    pub logs: HashMap<String, Vec<String>>,
    /// Every (action, id) the runtime was asked to perform.
    pub actions: Mutex<Vec<(&'static str, String)>>,
}

impl FakeRuntime {
    pub fn with_containers(containers: Vec<ContainerSummary>) -> Self {
        Self {
            containers,
            ..Default::default()
        }
    }

    pub fn actions(&self) -> Vec<(&'static str, String)> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: &'static str, id: &str) -> Result<(), HealthError> {
        if !self.containers.iter().any(|c| c.id == id) {
            return Err(HealthError::ContainerNotFound(id.into()));
        }
        self.actions.lock().unwrap().push((action, id.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, HealthError> {
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
        if self.unavailable {
            return Err(HealthError::RuntimeUnavailable(
                "connection refused".into(),
            ));
        }
        Ok(self.containers.clone())
    }

    async fn container_stats(&self, id: &str) -> Result<Option<StatsSample>, HealthError> {
        if self.panic_on_stats.iter().any(|p| p == id) {
            panic!("stats exploded for {}", id);
        }
        Ok(self.stats.get(id).copied())
    }

    async fn start_container(&self, id: &str) -> Result<(), HealthError> {
        self.record("start", id)
    }

    async fn stop_container(&self, id: &str) -> Result<(), HealthError> {
        self.record("stop", id)
    }

    async fn restart_container(&self, id: &str) -> Result<(), HealthError> {
        self.record("restart", id)
    }

    async fn container_logs(&self, id: &str, tail: usize) -> Result<Vec<String>, HealthError> {
        if !self.containers.iter().any(|c| c.id == id) {
            return Err(HealthError::ContainerNotFound(id.into()));
        }
        let lines = self.logs.get(id).cloned().unwrap_or_default();
        let skip = lines.len().saturating_sub(tail);
        Ok(lines.into_iter().skip(skip).collect())
    }
}

/// Prober answering from a table; unknown endpoints fail. Records every endpoint probed.
#[derive(Default)]
pub struct FakeProber {
    pub responses: HashMap<String, (ProbeResult, Duration)>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProber {
    pub fn respond(mut self, endpoint: &str, result: ProbeResult) -> Self {
        self.responses
            .insert(endpoint.into(), (result, Duration::ZERO));
        self
    }

    pub fn respond_after(mut self, endpoint: &str, result: ProbeResult, delay: Duration) -> Self {
        self.responses.insert(endpoint.into(), (result, delay));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, endpoint: &str, _skip_tls_verify: bool, _timeout: Duration) -> ProbeResult {
        self.calls.lock().unwrap().push(endpoint.to_string());
        match self.responses.get(endpoint) {
            Some((result, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                result.clone()
            }
            None => ProbeResult::Failed {
                reason: "connection refused".into(),
            },
        }
    }
}

pub fn ok(status: u16) -> ProbeResult {
    ProbeResult::Ok {
        http_status: status,
        latency_ms: 3,
    }
}

pub fn evaluator(runtime: Arc<FakeRuntime>, prober: Arc<FakeProber>) -> Arc<ServiceHealthEvaluator> {
    Arc::new(ServiceHealthEvaluator::new(
        Arc::new(ContainerStateProvider::new(runtime)),
        prober,
        Duration::from_secs(1),
    ))
}

pub fn aggregator(
    runtime: Arc<FakeRuntime>,
    prober: Arc<FakeProber>,
    evaluation_timeout: Duration,
) -> FleetHealthAggregator {
    FleetHealthAggregator::new(evaluator(runtime, prober), evaluation_timeout)
}

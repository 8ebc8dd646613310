// ContainerStateProvider over the in-memory runtime: state mapping and stats gating

mod common;

use common::{FakeRuntime, container, sample};
use servicewatch::container_state::ContainerStateProvider;
use servicewatch::error::HealthError;
use servicewatch::models::ContainerState;
use std::sync::Arc;

fn provider() -> ContainerStateProvider {
    let mut runtime = FakeRuntime::with_containers(vec![
        container("c1", "caddy", "running"),
        container("c2", "watchtower", "exited"),
        container("c3", "wiki", "paused"),
    ]);
    runtime.stats.insert("c1".into(), sample());
    runtime.stats.insert("c2".into(), sample());
    ContainerStateProvider::new(Arc::new(runtime))
}

fn unavailable() -> ContainerStateProvider {
    ContainerStateProvider::new(Arc::new(FakeRuntime {
        unavailable: true,
        ..Default::default()
    }))
}

#[tokio::test]
async fn get_state_maps_runtime_lifecycle() {
    let p = provider();
    assert_eq!(p.get_state("caddy").await, ContainerState::Running);
    assert_eq!(p.get_state("watchtower").await, ContainerState::Stopped);
    assert_eq!(p.get_state("wiki").await, ContainerState::Stopped);
    assert_eq!(p.get_state("portainer").await, ContainerState::NotFound);
}

#[tokio::test]
async fn get_state_reports_unreachable_runtime_as_error() {
    assert_eq!(unavailable().get_state("caddy").await, ContainerState::Error);
}

#[tokio::test]
async fn get_stats_derives_usage_for_running_container() {
    let usage = provider().get_stats("caddy").await.expect("running with stats");
    assert!((usage.cpu_percent - 10.0).abs() < 1e-9);
    assert!((usage.mem_percent - 25.0).abs() < 1e-9);
    assert_eq!(usage.mem_used_bytes, 50);
    assert_eq!(usage.mem_limit_bytes, 200);
}

#[tokio::test]
async fn get_stats_is_none_unless_running() {
    let p = provider();
    // c2 has a stats sample but is not running.
    assert!(p.get_stats("watchtower").await.is_none());
    assert!(p.get_stats("portainer").await.is_none());
    assert!(unavailable().get_stats("caddy").await.is_none());
}

#[tokio::test]
async fn find_distinguishes_missing_from_unreachable() {
    assert_eq!(provider().find("caddy").await.unwrap().id, "c1");
    assert!(matches!(
        provider().find("portainer").await,
        Err(HealthError::ContainerNotFound(_))
    ));
    assert!(matches!(
        unavailable().find("caddy").await,
        Err(HealthError::RuntimeUnavailable(_))
    ));
}

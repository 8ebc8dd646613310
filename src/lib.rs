// Fleet health monitor: container state + HTTP probes rolled into a fleet verdict

pub mod aggregator;
pub mod alerts;
pub mod config;
pub mod container_state;
pub mod docker_repo;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod models;
pub mod probe;
pub mod registry;
pub mod routes;
pub mod runtime;
pub mod sysinfo_repo;
pub mod version;
pub mod worker;

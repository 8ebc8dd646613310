// Error taxonomy for the health core

use thiserror::Error;

/// Faults the health core can hit. Everything except `ConfigurationInvalid` is absorbed into
/// per-service report data rather than failing a whole aggregation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HealthError {
    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("health probe failed: {0}")]
    ProbeFailed(String),

    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
}

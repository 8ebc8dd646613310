// Registry of monitored services, validated once at startup

use crate::config::ServiceConfig;
use crate::error::HealthError;
use crate::models::ServiceDescriptor;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Ordered, read-only set of service descriptors. Cloning shares the underlying list.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    services: Arc<Vec<ServiceDescriptor>>,
}

impl ServiceRegistry {
    /// Validate and freeze a descriptor list. Names must be non-empty and unique
    /// (case-insensitively); endpoints must be absolute http(s) URLs.
    pub fn new(services: Vec<ServiceDescriptor>) -> Result<Self, HealthError> {
        let mut seen = HashSet::with_capacity(services.len());
        for s in &services {
            if s.name.trim().is_empty() {
                return Err(HealthError::ConfigurationInvalid(
                    "service name must be non-empty".into(),
                ));
            }
            if !seen.insert(fold(&s.name)) {
                return Err(HealthError::ConfigurationInvalid(format!(
                    "duplicate service name: {}",
                    s.name
                )));
            }
            if s.container_name.as_deref().is_some_and(|c| c.trim().is_empty()) {
                return Err(HealthError::ConfigurationInvalid(format!(
                    "service {}: container_name must be non-empty when set",
                    s.name
                )));
            }
            if let Some(endpoint) = &s.health_endpoint {
                validate_endpoint(&s.name, endpoint)?;
            }
        }
        Ok(Self {
            services: Arc::new(services),
        })
    }

    pub fn from_config(services: &[ServiceConfig]) -> Result<Self, HealthError> {
        Self::new(
            services
                .iter()
                .map(|s| ServiceDescriptor {
                    name: s.name.clone(),
                    container_name: s.container_name.clone(),
                    health_endpoint: s.health_endpoint.clone(),
                    skip_tls_verify: s.skip_tls_verify,
                })
                .collect(),
        )
    }

    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Case-insensitive lookup by service name, folded the same way as the uniqueness check.
    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        let wanted = fold(name);
        self.services.iter().find(|s| fold(&s.name) == wanted)
    }
}

/// Unicode lowercase; the one case rule for both uniqueness and lookup.
fn fold(name: &str) -> String {
    name.to_lowercase()
}

fn validate_endpoint(service: &str, endpoint: &str) -> Result<(), HealthError> {
    let url = Url::parse(endpoint).map_err(|e| {
        HealthError::ConfigurationInvalid(format!(
            "service {}: malformed health_endpoint {:?}: {}",
            service, endpoint, e
        ))
    })?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(()),
        _ => Err(HealthError::ConfigurationInvalid(format!(
            "service {}: health_endpoint must be an http(s) URL, got {:?}",
            service, endpoint
        ))),
    }
}

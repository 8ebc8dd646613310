// HTTP health probes

use crate::error::HealthError;
use crate::models::ProbeResult;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default hard timeout for a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Performs one bounded GET against an endpoint. Never fails: transport problems come back as
/// [`ProbeResult::Failed`].
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &str, skip_tls_verify: bool, timeout: Duration) -> ProbeResult;
}

/// Map a response status to a probe result: anything below 500 means the application answered.
pub fn classify_status(status: u16, latency_ms: u64) -> ProbeResult {
    if status < 500 {
        ProbeResult::Ok {
            http_status: status,
            latency_ms,
        }
    } else {
        ProbeResult::Failed {
            reason: format!("HTTP {}", status),
        }
    }
}

/// Error text including its source chain, e.g. "error sending request: connection refused".
fn describe(e: &(dyn std::error::Error + 'static)) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        let text = s.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = s.source();
    }
    out
}

/// reqwest-backed prober. Holds one verifying and one non-verifying client so TLS bypass is
/// chosen per descriptor without rebuilding clients.
pub struct HttpProber {
    verifying: reqwest::Client,
    insecure: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> anyhow::Result<Self> {
        let user_agent = crate::version::user_agent();
        let verifying = reqwest::Client::builder()
            .user_agent(user_agent.clone())
            .build()?;
        let insecure = reqwest::Client::builder()
            .user_agent(user_agent)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            verifying,
            insecure,
        })
    }

    /// One GET; `Ok` carries the status and latency, transport failures are `ProbeFailed`.
    async fn send(
        &self,
        endpoint: &str,
        skip_tls_verify: bool,
        timeout: Duration,
    ) -> Result<(u16, u64), HealthError> {
        let client = if skip_tls_verify {
            &self.insecure
        } else {
            &self.verifying
        };
        let timed_out =
            || HealthError::ProbeFailed(format!("timed out after {}ms", timeout.as_millis()));
        let started = Instant::now();
        let request = client.get(endpoint).timeout(timeout).send();

        match tokio::time::timeout(timeout, request).await {
            Ok(Ok(response)) => Ok((
                response.status().as_u16(),
                started.elapsed().as_millis() as u64,
            )),
            Ok(Err(e)) if e.is_timeout() => Err(timed_out()),
            Ok(Err(e)) => Err(HealthError::ProbeFailed(describe(&e))),
            Err(_) => Err(timed_out()),
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &str, skip_tls_verify: bool, timeout: Duration) -> ProbeResult {
        let result = match self.send(endpoint, skip_tls_verify, timeout).await {
            Ok((status, latency_ms)) => classify_status(status, latency_ms),
            Err(HealthError::ProbeFailed(reason)) => ProbeResult::Failed { reason },
            Err(e) => ProbeResult::Failed {
                reason: e.to_string(),
            },
        };
        debug!(endpoint, ?result, "probe finished");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_below_500_are_accepted() {
        for status in [200u16, 204, 301, 401, 404, 499] {
            assert_eq!(
                classify_status(status, 5),
                ProbeResult::Ok {
                    http_status: status,
                    latency_ms: 5
                }
            );
        }
    }

    #[test]
    fn server_errors_fail_the_probe() {
        assert_eq!(
            classify_status(503, 5),
            ProbeResult::Failed {
                reason: "HTTP 503".into()
            }
        );
    }
}

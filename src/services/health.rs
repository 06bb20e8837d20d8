use std::time::Duration;

use serde::Deserialize;

const PROBE_TIMEOUT_SECS: u64 = 2;

/// Readiness check for the local inference sidecar.
#[async_trait::async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// True only when the sidecar answers and reports a loaded model.
    /// Stateless per call; readiness is re-checked on every orchestration.
    async fn is_ready(&self) -> bool;
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    model_loaded: bool,
}

/// Probes the sidecar's `/health` endpoint under a short timeout.
pub struct SidecarHealthProbe {
    base_url: String,
    client: reqwest::Client,
}

impl SidecarHealthProbe {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .build()
            .expect("failed to construct HTTP client");

        Self { base_url, client }
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl ReadinessProbe for SidecarHealthProbe {
    async fn is_ready(&self) -> bool {
        let url = self.health_url();

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("🩺 Sidecar health check failed: {}", e);
                return false;
            }
        };

        if !response.status().is_success() {
            log::debug!("🩺 Sidecar health endpoint returned {}", response.status());
            return false;
        }

        match response.json::<HealthResponse>().await {
            Ok(health) => {
                if !health.model_loaded {
                    log::debug!("🩺 Sidecar is up but no model is loaded yet");
                }
                health.model_loaded
            }
            Err(e) => {
                log::debug!("🩺 Sidecar health payload was not readable: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_url_joins_without_double_slash() {
        let probe = SidecarHealthProbe::new("http://127.0.0.1:8081/".to_string());
        assert_eq!(probe.health_url(), "http://127.0.0.1:8081/health");

        let probe = SidecarHealthProbe::new("http://127.0.0.1:8081".to_string());
        assert_eq!(probe.health_url(), "http://127.0.0.1:8081/health");
    }
}

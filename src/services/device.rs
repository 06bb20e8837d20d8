use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose, Engine};
use serde::Serialize;
use serde_json::Value;

use super::health::ReadinessProbe;
use super::provider::{AnalysisProvider, ProviderError};
use crate::models::MealImage;

// Long on purpose: a cold sidecar may still be loading model weights on the
// first request, and the caller already expects analysis to take a while.
const SIDECAR_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Serialize)]
struct AnalyzeRequest {
    image_path: String,
    image_base64: String,
}

/// Local HTTP inference sidecar provider.
///
/// Gated by the readiness probe so a cold process is never hit with a large
/// payload it cannot serve yet.
pub struct DeviceSidecarService {
    base_url: String,
    probe: Arc<dyn ReadinessProbe>,
    client: reqwest::Client,
}

impl DeviceSidecarService {
    pub fn new(base_url: String, probe: Arc<dyn ReadinessProbe>) -> Self {
        Self::with_timeout(base_url, probe, Duration::from_secs(SIDECAR_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: String,
        probe: Arc<dyn ReadinessProbe>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to construct HTTP client");

        Self {
            base_url,
            probe,
            client,
        }
    }

    fn analyze_url(&self) -> String {
        format!("{}/analyze", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for DeviceSidecarService {
    fn name(&self) -> &str {
        "device"
    }

    async fn attempt(&self, image: &MealImage) -> Result<Value, ProviderError> {
        if !self.probe.is_ready().await {
            log::warn!("🩺 Sidecar not ready, skipping device analysis");
            return Err(ProviderError::NotReady);
        }

        let request = AnalyzeRequest {
            image_path: image.path.clone().unwrap_or_default(),
            image_base64: general_purpose::STANDARD.encode(&image.bytes),
        };

        log::info!(
            "📡 Sending meal photo to local sidecar at {} ({} bytes base64)",
            self.base_url,
            request.image_base64.len()
        );

        let response = self
            .client
            .post(self.analyze_url())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Sidecar error ({}): {}", status, error_text);
            return Err(ProviderError::Transport(format!("{}: {}", status, error_text)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::UnparseableResponse(e.to_string()))?;

        // A 200 can still carry a declared failure from the sidecar itself.
        if payload.get("fallback").and_then(Value::as_bool) == Some(true) {
            let reason = payload
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("sidecar requested fallback");
            log::warn!("⚠️ Sidecar declined to analyze: {}", reason);
            return Err(ProviderError::UnparseableResponse(reason.to_string()));
        }

        // Success bar: at least a name or a numeric score must be present.
        let has_name = payload.get("name").and_then(Value::as_str).is_some();
        let has_score = payload.get("score").map(|v| v.is_number()).unwrap_or(false);
        if !has_name && !has_score {
            return Err(ProviderError::UnparseableResponse(
                "payload carries neither a name nor a numeric score".to_string(),
            ));
        }

        Ok(payload)
    }
}

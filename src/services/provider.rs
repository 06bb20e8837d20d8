use serde_json::Value;
use thiserror::Error;

use crate::models::MealImage;

/// Why a provider attempt produced no usable payload.
/// Consumed only by the orchestrator's fallback logic; never surfaced to callers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider credential is not configured")]
    ConfigurationMissing,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unparseable response: {0}")]
    UnparseableResponse(String),

    #[error("inference sidecar is not ready")]
    NotReady,
}

/// One external system capable of turning a meal photo into a raw
/// nutrition payload. The orchestrator iterates over an ordered list of
/// these without knowing which transport sits behind each.
#[async_trait::async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Short name for logging ("cloud", "device").
    fn name(&self) -> &str;

    /// Try exactly once. No retries here; retry and fallback belong to the
    /// orchestrator.
    async fn attempt(&self, image: &MealImage) -> Result<Value, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn AnalysisProvider) {}

    #[test]
    fn test_error_messages_name_the_cause() {
        let err = ProviderError::Transport("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = ProviderError::ConfigurationMissing;
        assert!(err.to_string().contains("credential"));
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use super::fallback::SyntheticMealGenerator;
use super::normalizer::normalize;
use super::provider::{AnalysisProvider, ProviderError};
use crate::models::{MealAnalysis, MealImage, ProcessingPreference};

// Upper bound on one whole orchestration, all provider attempts included.
// Without it the worst case would be the sum of every provider timeout.
const REQUEST_DEADLINE_SECS: u64 = 300;

/// One attempt at one provider. Created and dropped within a single
/// orchestration call; only its log lines survive.
struct ProviderAttempt<'a> {
    provider: &'a str,
    started: Instant,
}

impl<'a> ProviderAttempt<'a> {
    fn begin(provider: &'a str) -> Self {
        log::info!("🍽️ Trying {} provider...", provider);
        Self {
            provider,
            started: Instant::now(),
        }
    }

    fn succeeded(self) {
        log::info!(
            "✅ {} provider answered in {} ms",
            self.provider,
            self.started.elapsed().as_millis()
        );
    }

    fn failed(self, err: &ProviderError) {
        log::warn!(
            "⚠️ {} provider failed after {} ms: {}",
            self.provider,
            self.started.elapsed().as_millis(),
            err
        );
    }
}

/// Top-level analysis policy.
///
/// Picks a provider order from the caller's preference, walks it
/// sequentially, normalizes the first raw success, and serves a synthetic
/// analysis when everything else fails. `analyze` never returns an error:
/// availability beats fidelity here.
pub struct AnalysisOrchestrator {
    cloud: Arc<dyn AnalysisProvider>,
    device: Arc<dyn AnalysisProvider>,
    generator: SyntheticMealGenerator,
    deadline: Duration,
}

impl AnalysisOrchestrator {
    pub fn new(cloud: Arc<dyn AnalysisProvider>, device: Arc<dyn AnalysisProvider>) -> Self {
        Self {
            cloud,
            device,
            generator: SyntheticMealGenerator::new(),
            deadline: Duration::from_secs(REQUEST_DEADLINE_SECS),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Analyze one meal photo. Always produces a canonical record; the only
    /// user-visible degradation is a lower-fidelity synthetic result.
    pub async fn analyze(&self, image: &MealImage, preference: &str) -> MealAnalysis {
        let preference = match ProcessingPreference::from_string(preference) {
            Some(p) => p,
            None => {
                log::warn!(
                    "❓ Unknown processing preference '{}', serving synthetic analysis",
                    preference
                );
                return self.generator.generate();
            }
        };

        log::info!("🚦 Routing analysis with preference: {}", preference);

        match tokio::time::timeout(self.deadline, self.try_providers(image, preference)).await {
            Ok(Some(raw)) => normalize(&raw),
            Ok(None) => {
                log::warn!("🔄 All providers failed, falling back to synthetic analysis");
                self.generator.generate()
            }
            Err(_) => {
                log::warn!(
                    "⏰ Analysis exceeded the {} s deadline, serving synthetic analysis",
                    self.deadline.as_secs()
                );
                self.generator.generate()
            }
        }
    }

    /// Walk the provider chain in order and return the first raw success.
    /// Strictly sequential: the fallback provider only runs once the primary
    /// has definitively failed.
    async fn try_providers(
        &self,
        image: &MealImage,
        preference: ProcessingPreference,
    ) -> Option<Value> {
        for provider in self.route(preference) {
            let attempt = ProviderAttempt::begin(provider.name());
            match provider.attempt(image).await {
                Ok(raw) => {
                    attempt.succeeded();
                    return Some(raw);
                }
                Err(err) => attempt.failed(&err),
            }
        }
        None
    }

    fn route(&self, preference: ProcessingPreference) -> [&Arc<dyn AnalysisProvider>; 2] {
        match preference {
            ProcessingPreference::Cloud | ProcessingPreference::Auto => [&self.cloud, &self.device],
            ProcessingPreference::Device => [&self.device, &self.cloud],
        }
    }
}

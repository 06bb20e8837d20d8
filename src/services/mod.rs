pub mod cloud; // Remote multimodal vision API
pub mod device; // Local inference sidecar
pub mod fallback;
pub mod health;
pub mod normalizer;
pub mod orchestrator;
pub mod provider;
pub mod report;

pub use cloud::CloudVisionService;
pub use device::DeviceSidecarService;
pub use fallback::SyntheticMealGenerator;
pub use health::{ReadinessProbe, SidecarHealthProbe};
pub use normalizer::normalize;
pub use orchestrator::AnalysisOrchestrator;
pub use provider::{AnalysisProvider, ProviderError};
pub use report::format_analysis_report;

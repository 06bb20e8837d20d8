pub mod models;
pub mod services;

pub use models::{MealAnalysis, MealImage, ProcessingPreference};
pub use services::AnalysisOrchestrator;

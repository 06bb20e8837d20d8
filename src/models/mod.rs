use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Analyzed Meal";
pub const DEFAULT_SCORE: i32 = 75;
pub const DEFAULT_CARBS: f64 = 35.0;
pub const DEFAULT_PROTEIN: f64 = 25.0;
pub const DEFAULT_FATS: f64 = 15.0;
pub const DEFAULT_CALORIES: i32 = 450;
pub const DEFAULT_HYDRATION: i32 = 70;
pub const DEFAULT_ADVICE: &str =
    "Aim for a balanced plate: vegetables, lean protein, whole grains and plenty of water.";

/// Canonical analysis record. Every field is always present and in range
/// once it leaves the normalizer or the synthetic generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealAnalysis {
    pub name: String,
    pub score: i32,     // 0-100
    pub carbs: f64,     // grams, >= 0
    pub protein: f64,   // grams, >= 0
    pub fats: f64,      // grams, >= 0
    pub calories: i32,  // kcal, >= 0
    pub hydration: i32, // 0-100 index
    pub advice: String,
    pub ingredients: Vec<String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

impl Default for MealAnalysis {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            score: DEFAULT_SCORE,
            carbs: DEFAULT_CARBS,
            protein: DEFAULT_PROTEIN,
            fats: DEFAULT_FATS,
            calories: DEFAULT_CALORIES,
            hydration: DEFAULT_HYDRATION,
            advice: DEFAULT_ADVICE.to_string(),
            ingredients: Vec::new(),
            strengths: Vec::new(),
            improvements: Vec::new(),
        }
    }
}

/// One uploaded meal photo, as handed to the providers.
/// The path travels alongside the bytes because the device sidecar wants both.
#[derive(Debug, Clone)]
pub struct MealImage {
    pub path: Option<String>,
    pub bytes: Vec<u8>,
}

impl MealImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { path: None, bytes }
    }

    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            path: Some(path.to_string()),
            bytes,
        })
    }
}

/// Caller-supplied routing hint for a single analysis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingPreference {
    Auto,
    Cloud,
    Device,
}

impl std::fmt::Display for ProcessingPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessingPreference::Auto => "auto",
            ProcessingPreference::Cloud => "cloud",
            ProcessingPreference::Device => "device",
        };
        write!(f, "{}", s)
    }
}

impl ProcessingPreference {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Some(ProcessingPreference::Auto),
            "cloud" => Some(ProcessingPreference::Cloud),
            "device" | "local" => Some(ProcessingPreference::Device),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_parsing() {
        assert_eq!(
            ProcessingPreference::from_string("cloud"),
            Some(ProcessingPreference::Cloud)
        );
        assert_eq!(
            ProcessingPreference::from_string("  Device "),
            Some(ProcessingPreference::Device)
        );
        assert_eq!(
            ProcessingPreference::from_string("AUTO"),
            Some(ProcessingPreference::Auto)
        );
        assert_eq!(ProcessingPreference::from_string("fastest"), None);
        assert_eq!(ProcessingPreference::from_string(""), None);
    }

    #[test]
    fn test_default_record_is_in_range() {
        let analysis = MealAnalysis::default();
        assert_eq!(analysis.name, DEFAULT_NAME);
        assert!((0..=100).contains(&analysis.score));
        assert!((0..=100).contains(&analysis.hydration));
        assert!(analysis.carbs >= 0.0 && analysis.protein >= 0.0 && analysis.fats >= 0.0);
        assert!(analysis.calories >= 0);
        assert!(!analysis.advice.is_empty());
        assert!(analysis.ingredients.is_empty());
    }
}

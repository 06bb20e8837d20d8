use serde_json::Value;

use crate::models::{
    MealAnalysis, DEFAULT_ADVICE, DEFAULT_CALORIES, DEFAULT_CARBS, DEFAULT_FATS, DEFAULT_HYDRATION,
    DEFAULT_NAME, DEFAULT_PROTEIN, DEFAULT_SCORE,
};

/// Map any raw provider payload into the canonical record.
///
/// Total over any input: every field parses-or-defaults, then clamps, so
/// downstream code never sees a missing or out-of-range value no matter how
/// malformed the provider response was. Pure; no I/O.
pub fn normalize(raw: &Value) -> MealAnalysis {
    MealAnalysis {
        name: string_field(raw, "name", DEFAULT_NAME),
        score: int_field(raw, "score", DEFAULT_SCORE).clamp(0, 100),
        carbs: float_field(raw, "carbs", DEFAULT_CARBS).max(0.0),
        protein: float_field(raw, "protein", DEFAULT_PROTEIN).max(0.0),
        fats: float_field(raw, "fats", DEFAULT_FATS).max(0.0),
        calories: int_field(raw, "calories", DEFAULT_CALORIES).max(0),
        hydration: int_field(raw, "hydration", DEFAULT_HYDRATION).clamp(0, 100),
        advice: string_field(raw, "advice", DEFAULT_ADVICE),
        ingredients: list_field(raw, "ingredients"),
        strengths: list_field(raw, "strengths"),
        improvements: list_field(raw, "improvements"),
    }
}

fn string_field(raw: &Value, key: &str, default: &str) -> String {
    match raw.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default.to_string(),
    }
}

fn float_field(raw: &Value, key: &str, default: f64) -> f64 {
    match raw.get(key) {
        Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(default),
        // Some models quote their numbers.
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).unwrap_or(default),
        _ => default,
    }
}

fn int_field(raw: &Value, key: &str, default: i32) -> i32 {
    let value = float_field(raw, key, default as f64);
    if value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        value.round() as i32
    } else {
        default
    }
}

fn list_field(raw: &Value, key: &str) -> Vec<String> {
    match raw.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

use crate::models::MealAnalysis;

/// Render an analysis for terminal display.
pub fn format_analysis_report(analysis: &MealAnalysis) -> String {
    let score_bar = create_progress_bar(analysis.score as f64, 100.0);
    let hydration_bar = create_progress_bar(analysis.hydration as f64, 100.0);

    let mut report = format!(
        "🍽️ *{}*\n\n\
         ⭐ Health Score\n\
         {}\n\
         {}/100\n\n\
         💧 Hydration\n\
         {}\n\
         {}/100\n\n\
         🔥 Calories: {} kcal\n\
         🍞 Carbs: {:.0} g | 🥩 Protein: {:.0} g | 🧈 Fats: {:.0} g\n",
        analysis.name,
        score_bar.bar,
        analysis.score,
        hydration_bar.bar,
        analysis.hydration,
        analysis.calories,
        analysis.carbs,
        analysis.protein,
        analysis.fats,
    );

    if !analysis.ingredients.is_empty() {
        report.push_str(&format!("\n🧾 Ingredients: {}\n", analysis.ingredients.join(", ")));
    }
    if !analysis.strengths.is_empty() {
        report.push_str("\n👍 Strengths:\n");
        for strength in &analysis.strengths {
            report.push_str(&format!("   • {}\n", strength));
        }
    }
    if !analysis.improvements.is_empty() {
        report.push_str("\n🔧 Could be better:\n");
        for improvement in &analysis.improvements {
            report.push_str(&format!("   • {}\n", improvement));
        }
    }

    report.push_str(&format!("\n💡 {}", analysis.advice));
    report
}

struct ProgressBar {
    bar: String,
}

fn create_progress_bar(current: f64, goal: f64) -> ProgressBar {
    let percentage = ((current / goal) * 100.0).min(100.0) as i32;
    let filled = (percentage / 10) as usize;
    let empty = 10 - filled;

    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));

    ProgressBar { bar }
}

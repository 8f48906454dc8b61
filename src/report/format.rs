//! Terminal rendering of a nutrition record.

use crate::domain::{Language, NutritionRecord};
use crate::error::{AppError, EXIT_DATA_FORMAT};
use crate::report::messages::Message;

/// Four counters, then quality and tip lines when present.
pub fn format_record(record: &NutritionRecord, lang: Language) -> String {
    let grams = Message::UnitGrams.text(lang);
    let rows = [
        (Message::Calories, record.calories, ""),
        (Message::Protein, record.protein_g, grams),
        (Message::Carbs, record.carbs_g, grams),
        (Message::Fat, record.fat_g, grams),
    ];

    let width = rows
        .iter()
        .map(|(label, _, _)| label.text(lang).chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (label, value, unit) in rows {
        let label = label.text(lang);
        let pad = width - label.chars().count();
        out.push_str(&format!("{label}{} : {value}{unit}\n", " ".repeat(pad)));
    }

    if record.has_meal_info() {
        out.push('\n');
    }
    if let Some(quality) = &record.quality {
        out.push_str(&format!("{}: {quality}\n", Message::Quality.text(lang)));
    }
    if let Some(tip) = &record.tip {
        out.push_str(&format!("{}: {tip}\n", Message::Tip.text(lang)));
    }

    out
}

pub fn format_record_json(record: &NutritionRecord) -> Result<String, AppError> {
    serde_json::to_string_pretty(record)
        .map_err(|e| AppError::new(EXIT_DATA_FORMAT, format!("Failed to serialize result: {e}")))
}

/// Progress line shown while waiting, e.g. `AI Analyzing... 3s`.
pub fn format_wait_progress(elapsed_secs: u64, lang: Language) -> String {
    format!("{} {elapsed_secs}s", Message::AnalyzingProgress.text(lang))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> NutritionRecord {
        NutritionRecord {
            calories: 1040,
            protein_g: 41,
            carbs_g: 90,
            fat_g: 59,
            quality: None,
            tip: None,
        }
    }

    #[test]
    fn counters_carry_gram_suffix_except_calories() {
        let out = format_record(&record(), Language::En);
        assert_eq!(
            out,
            "Calories : 1040\nProtein  : 41g\nCarbs    : 90g\nFat      : 59g\n"
        );
    }

    #[test]
    fn chinese_units_are_localized() {
        let out = format_record(&record(), Language::Zh);
        assert!(out.contains("41克"));
        assert!(out.contains("1040\n"));
    }

    #[test]
    fn meal_info_only_when_present() {
        let mut r = record();
        r.tip = Some("eat more veg".to_string());
        let out = format_record(&r, Language::En);
        assert!(out.ends_with("\nTip: eat more veg\n"));
        assert!(!out.contains("Meal quality"));

        r.quality = Some("high fat".to_string());
        let out = format_record(&r, Language::En);
        assert!(out.contains("Meal quality: high fat\nTip: eat more veg\n"));
    }

    #[test]
    fn wait_progress_line() {
        assert_eq!(format_wait_progress(3, Language::En), "AI Analyzing... 3s");
    }
}

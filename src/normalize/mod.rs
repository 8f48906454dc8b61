//! Response normalization: any document the analysis service sends back
//! becomes a [`NutritionRecord`].
//!
//! Known shapes are tried in a fixed order and the first one that decodes
//! wins:
//!
//! 1. a top-level array is unwrapped to its first element
//! 2. `output.totals` (+ optional `output.mealSummary`)
//! 3. `output.items`, summed
//! 4. `totals`, suffixed keys preferred
//! 5. top-level `calories` / `calories_kcal`, bare keys preferred
//! 6. `rawResponse` text, parsed and normalized again
//!
//! Steps 2-5 are keyed on presence: a truthy `output` is read only as
//! steps 2-3, and a truthy `totals` only as step 4, even when they yield
//! nothing. Only JSON objects are read; arrays never map to fields.
//!
//! A document that yields four zeros and has no usable `rawResponse` is a
//! data-format error.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::NutritionRecord;
use crate::error::NormalizeError;

pub mod shapes;

use shapes::{DirectDoc, Macros, OutputItemsDoc, OutputTotalsDoc, RawDoc, TotalsDoc, is_truthy};

/// Which known shape a document was read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeKind {
    OutputTotals,
    OutputItems,
    Totals,
    Direct,
    Unrecognized,
}

/// Figures plus meal notes extracted from one working document.
#[derive(Debug, Clone, PartialEq)]
struct Extracted {
    shape: ShapeKind,
    macros: Macros,
    quality: Option<String>,
    tip: Option<String>,
}

/// Normalize a response document.
pub fn normalize(document: &Value) -> Result<NutritionRecord, NormalizeError> {
    let mut current = document.clone();

    // Each pass either returns or replaces `current` with the parsed contents
    // of a `rawResponse` string, which is strictly shorter than the document
    // it came from, so this terminates.
    loop {
        let Some(working) = working_document(&current) else {
            warn!("response document is an empty array");
            return Err(NormalizeError::DataFormat);
        };
        let extracted = extract(working);
        debug!(shape = ?extracted.shape, macros = ?extracted.macros, "response document classified");

        if !extracted.macros.is_zero() {
            return Ok(into_record(extracted));
        }

        match reparse_raw(working) {
            Some(parsed) => {
                debug!("retrying normalization on parsed rawResponse");
                current = parsed;
            }
            None => {
                warn!(shape = ?extracted.shape, "no nutrition figures in response document");
                return Err(NormalizeError::DataFormat);
            }
        }
    }
}

/// Arrays stand for their first element; an empty array has none.
fn working_document(document: &Value) -> Option<&Value> {
    match document {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

fn extract(doc: &Value) -> Extracted {
    let unrecognized = bare(ShapeKind::Unrecognized, Macros::default());
    if !doc.is_object() {
        return unrecognized;
    }

    // A present `output` claims the document even when it holds neither
    // totals nor items, and likewise a present `totals` rules out the
    // top-level figures.
    if doc.get("output").is_some_and(is_truthy) {
        if let Ok(parsed) = OutputTotalsDoc::deserialize(doc) {
            let summary = parsed.output.meal_summary.unwrap_or_default();
            return Extracted {
                shape: ShapeKind::OutputTotals,
                macros: parsed.output.totals.macros(),
                quality: summary.quality,
                tip: summary.overall_tip,
            };
        }
        if let Ok(parsed) = OutputItemsDoc::deserialize(doc) {
            return bare(ShapeKind::OutputItems, parsed.output.macros());
        }
        return unrecognized;
    }

    if doc.get("totals").is_some_and(is_truthy) {
        return match TotalsDoc::deserialize(doc) {
            Ok(parsed) => bare(ShapeKind::Totals, parsed.totals.suffixed_first()),
            Err(_) => unrecognized,
        };
    }

    if DirectDoc::applies_to(doc) {
        if let Ok(parsed) = DirectDoc::deserialize(doc) {
            return bare(ShapeKind::Direct, parsed.fields.bare_first());
        }
    }

    unrecognized
}

fn bare(shape: ShapeKind, macros: Macros) -> Extracted {
    Extracted {
        shape,
        macros,
        quality: None,
        tip: None,
    }
}

fn reparse_raw(doc: &Value) -> Option<Value> {
    let raw = RawDoc::deserialize(doc).ok()?;
    match serde_json::from_str::<Value>(raw.raw_response.trim()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            debug!(error = %err, "rawResponse is not JSON");
            None
        }
    }
}

fn into_record(extracted: Extracted) -> NutritionRecord {
    let m = extracted.macros;
    NutritionRecord {
        calories: to_count(m.calories),
        protein_g: to_count(m.protein),
        carbs_g: to_count(m.carbs),
        fat_g: to_count(m.fat),
        quality: extracted.quality,
        tip: extracted.tip,
    }
}

/// Clamp to `[0, u32::MAX]` and round half up.
fn to_count(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value + 0.5).floor().min(f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_totals_with_meal_summary() {
        let doc = json!([{
            "output": {
                "totals": {"calories_kcal": 1040, "protein_g": 41, "carbs_g": 90, "fat_g": 59},
                "mealSummary": {"quality": "high fat", "overallTip": "eat more veg"}
            }
        }]);
        let record = normalize(&doc).unwrap();
        assert_eq!(
            record,
            NutritionRecord {
                calories: 1040,
                protein_g: 41,
                carbs_g: 90,
                fat_g: 59,
                quality: Some("high fat".to_string()),
                tip: Some("eat more veg".to_string()),
            }
        );
    }

    #[test]
    fn output_totals_are_rounded() {
        let doc = json!({"output": {"totals": {"calories_kcal": 512.49, "protein_g": 20.5, "carbs_g": "33.7", "fat_g": 9.2}}});
        let record = normalize(&doc).unwrap();
        assert_eq!((record.calories, record.protein_g, record.carbs_g, record.fat_g), (512, 21, 34, 9));
        assert!(!record.has_meal_info());
    }

    #[test]
    fn output_items_are_summed() {
        let doc = json!({"output": {"items": [
            {"calories_kcal": 300, "protein_g": 18, "carbs_g": 16, "fat_g": 18},
            {"calories_kcal": 420, "protein_g": 22, "carbs_g": 32, "fat_g": 22}
        ]}});
        let record = normalize(&doc).unwrap();
        assert_eq!(
            record,
            NutritionRecord {
                calories: 720,
                protein_g: 40,
                carbs_g: 48,
                fat_g: 40,
                quality: None,
                tip: None,
            }
        );
    }

    #[test]
    fn items_are_summed_before_rounding() {
        let doc = json!({"output": {"items": [
            {"calories_kcal": 100.3, "protein_g": 0.4},
            {"calories_kcal": 100.3, "protein_g": 0.4}
        ]}});
        let record = normalize(&doc).unwrap();
        assert_eq!(record.calories, 201);
        assert_eq!(record.protein_g, 1);
    }

    #[test]
    fn totals_shape_prefers_suffixed_keys_with_fallback() {
        let doc = json!({"totals": {"calories_kcal": 610, "calories": 1, "protein": 25, "carbs_g": 70, "fat": "12"}});
        let record = normalize(&doc).unwrap();
        assert_eq!((record.calories, record.protein_g, record.carbs_g, record.fat_g), (610, 25, 70, 12));
    }

    #[test]
    fn direct_shape_prefers_bare_keys() {
        let doc = json!({"calories": 450, "calories_kcal": 999, "protein_g": 25, "carbs": 35, "fat": 18});
        let record = normalize(&doc).unwrap();
        assert_eq!((record.calories, record.protein_g, record.carbs_g, record.fat_g), (450, 25, 35, 18));
        assert_eq!(extract(&doc).shape, ShapeKind::Direct);
    }

    #[test]
    fn direct_shape_accepts_calories_kcal_alone() {
        let doc = json!({"calories_kcal": 380});
        assert_eq!(normalize(&doc).unwrap().calories, 380);
    }

    #[test]
    fn garbage_fields_degrade_to_zero() {
        let doc = json!({"output": {"totals": {"calories_kcal": 700, "protein_g": "lots", "carbs_g": null, "fat_g": -4}}});
        let record = normalize(&doc).unwrap();
        assert_eq!((record.calories, record.protein_g, record.carbs_g, record.fat_g), (700, 0, 0, 0));
    }

    #[test]
    fn output_totals_beat_output_items() {
        let doc = json!({"output": {
            "totals": {"calories_kcal": 10},
            "items": [{"calories_kcal": 999}]
        }});
        assert_eq!(extract(&doc).shape, ShapeKind::OutputTotals);
        assert_eq!(normalize(&doc).unwrap().calories, 10);
    }

    #[test]
    fn positional_arrays_are_not_nutrition_figures() {
        for doc in [
            json!({"output": {"totals": [1040, 41, 90, 59]}}),
            json!({"output": {"items": [[300, 18, 16, 18], [420, 22, 32, 22]]}}),
            json!({"totals": [610, 1, 25]}),
            json!([[1040, 41, 90, 59]]),
        ] {
            assert_eq!(normalize(&doc), Err(NormalizeError::DataFormat), "{doc}");
        }
    }

    #[test]
    fn present_output_rules_out_top_level_figures() {
        let doc = json!({"output": "Workflow was started", "calories": 500, "protein": 20});
        assert_eq!(extract(&doc).shape, ShapeKind::Unrecognized);
        assert_eq!(normalize(&doc), Err(NormalizeError::DataFormat));

        let doc = json!({"output": {"status": "queued"}, "totals": {"calories": 300}});
        assert_eq!(normalize(&doc), Err(NormalizeError::DataFormat));
    }

    #[test]
    fn present_totals_rule_out_direct_figures() {
        let doc = json!({"totals": "pending", "calories": 500});
        assert_eq!(extract(&doc).shape, ShapeKind::Totals);
        assert_eq!(normalize(&doc), Err(NormalizeError::DataFormat));
    }

    #[test]
    fn falsy_output_falls_back_to_later_shapes() {
        let doc = json!({"output": null, "totals": {"calories": 300}});
        assert_eq!(normalize(&doc).unwrap().calories, 300);

        let doc = json!({"output": "", "calories": 250});
        assert_eq!(normalize(&doc).unwrap().calories, 250);
    }

    #[test]
    fn output_totals_fall_back_to_items_when_totals_are_empty() {
        let doc = json!({"output": {"totals": null, "items": [{"calories_kcal": 120}]}});
        assert_eq!(extract(&doc).shape, ShapeKind::OutputItems);
        assert_eq!(normalize(&doc).unwrap().calories, 120);
    }

    #[test]
    fn raw_response_is_reparsed() {
        let inner = json!([{"output": {
            "totals": {"calories_kcal": 1040, "protein_g": 41, "carbs_g": 90, "fat_g": 59},
            "mealSummary": {"quality": "high fat", "overallTip": "eat more veg"}
        }}]);
        let wrapped = json!({"rawResponse": inner.to_string()});
        assert_eq!(normalize(&wrapped).unwrap(), normalize(&inner).unwrap());
    }

    #[test]
    fn nested_raw_responses_unwrap_repeatedly() {
        let inner = json!({"calories": 300, "protein": 10});
        let once = json!({"rawResponse": inner.to_string()});
        let twice = json!([{"rawResponse": once.to_string()}]);
        assert_eq!(normalize(&twice).unwrap().calories, 300);
    }

    #[test]
    fn all_zero_document_is_a_format_error() {
        let doc = json!({"output": {"totals": {"calories_kcal": 0, "protein_g": 0, "carbs_g": 0, "fat_g": 0}}});
        assert_eq!(normalize(&doc), Err(NormalizeError::DataFormat));
    }

    #[test]
    fn unrecognized_documents_are_format_errors() {
        for doc in [
            json!({"message": "Workflow was started"}),
            json!([]),
            json!("just text"),
            json!(null),
            json!({"rawResponse": "<html>Bad gateway</html>"}),
            json!({"rawResponse": "{\"status\": \"queued\"}"}),
        ] {
            assert_eq!(normalize(&doc), Err(NormalizeError::DataFormat), "{doc}");
        }
    }

    #[test]
    fn to_count_rounds_half_up_and_clamps() {
        assert_eq!(to_count(2.5), 3);
        assert_eq!(to_count(2.49), 2);
        assert_eq!(to_count(-0.4), 0);
        assert_eq!(to_count(f64::NAN), 0);
        assert_eq!(to_count(1e20), u32::MAX);
    }
}

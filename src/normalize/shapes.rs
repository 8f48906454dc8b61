//! Typed views of the response shapes the analysis service is known to send.
//!
//! Each shape is a plain serde struct. Numeric fields use [`Amount`], which
//! never fails to decode: anything that is not a finite number (or a string
//! holding one) reads as zero. A shape therefore only fails to decode when a
//! *structural* key is missing or has the wrong kind of value.
//!
//! Derived structs would also accept a JSON array as positional fields, so
//! every field struct is read through [`object_only`] or [`truthy_object`].

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A lenient numeric field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Amount(pub f64);

impl Amount {
    pub fn value(self) -> f64 {
        self.0
    }

    /// First non-zero amount, else zero.
    pub fn or(self, fallback: Amount) -> Amount {
        if self.0 != 0.0 { self } else { fallback }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Amount(coerce_number(&raw)))
    }
}

/// Read a JSON value as a number the way a form field would be read:
/// numbers pass through, numeric strings are parsed, blank strings and
/// everything else are zero.
pub fn coerce_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Four running totals before rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    pub fn is_zero(&self) -> bool {
        self.calories == 0.0 && self.protein == 0.0 && self.carbs == 0.0 && self.fat == 0.0
    }

    fn add(&mut self, other: Macros) {
        self.calories += other.calories;
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
    }
}

/// Suffixed keys only, as used inside the `output` wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SuffixedFields {
    pub calories_kcal: Amount,
    pub protein_g: Amount,
    pub carbs_g: Amount,
    pub fat_g: Amount,
}

impl SuffixedFields {
    pub fn macros(&self) -> Macros {
        Macros {
            calories: self.calories_kcal.value(),
            protein: self.protein_g.value(),
            carbs: self.carbs_g.value(),
            fat: self.fat_g.value(),
        }
    }
}

/// Both key spellings, for the loosely-structured fallback shapes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MixedFields {
    pub calories_kcal: Amount,
    pub calories: Amount,
    pub protein_g: Amount,
    pub protein: Amount,
    pub carbs_g: Amount,
    pub carbs: Amount,
    pub fat_g: Amount,
    pub fat: Amount,
}

impl MixedFields {
    /// Suffixed key wins, bare key fills in.
    pub fn suffixed_first(&self) -> Macros {
        Macros {
            calories: self.calories_kcal.or(self.calories).value(),
            protein: self.protein_g.or(self.protein).value(),
            carbs: self.carbs_g.or(self.carbs).value(),
            fat: self.fat_g.or(self.fat).value(),
        }
    }

    /// Bare key wins, suffixed key fills in.
    pub fn bare_first(&self) -> Macros {
        Macros {
            calories: self.calories.or(self.calories_kcal).value(),
            protein: self.protein.or(self.protein_g).value(),
            carbs: self.carbs.or(self.carbs_g).value(),
            fat: self.fat.or(self.fat_g).value(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSummary {
    #[serde(default, deserialize_with = "lenient_text")]
    pub quality: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub overall_tip: Option<String>,
}

/// `{"output": {"totals": {...}, "mealSummary": {...}}}`
#[derive(Debug, Clone, Deserialize)]
pub struct OutputTotalsDoc {
    #[serde(deserialize_with = "object_only")]
    pub output: OutputTotals,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTotals {
    #[serde(deserialize_with = "truthy_object")]
    pub totals: SuffixedFields,
    #[serde(default, deserialize_with = "lenient_summary")]
    pub meal_summary: Option<MealSummary>,
}

/// `{"output": {"items": [{...}, ...]}}`
#[derive(Debug, Clone, Deserialize)]
pub struct OutputItemsDoc {
    #[serde(deserialize_with = "object_only")]
    pub output: OutputItems,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputItems {
    pub items: Vec<Value>,
}

impl OutputItems {
    /// Sum of every item's figures. Items that are not objects count as zero.
    pub fn macros(&self) -> Macros {
        let mut total = Macros::default();
        for item in self.items.iter().filter(|item| item.is_object()) {
            if let Ok(fields) = SuffixedFields::deserialize(item) {
                total.add(fields.macros());
            }
        }
        total
    }
}

/// `{"totals": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct TotalsDoc {
    #[serde(deserialize_with = "truthy_object")]
    pub totals: MixedFields,
}

/// `{"calories": ..., "protein": ..., ...}`
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct DirectDoc {
    pub fields: MixedFields,
}

impl DirectDoc {
    /// Only objects that name calories at the top level count as this shape.
    pub fn applies_to(doc: &Value) -> bool {
        doc.is_object() && (doc.get("calories").is_some() || doc.get("calories_kcal").is_some())
    }
}

/// `{"rawResponse": "<text>"}`
#[derive(Debug, Clone, Deserialize)]
pub struct RawDoc {
    #[serde(rename = "rawResponse")]
    pub raw_response: String,
}

/// JavaScript truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A struct that may only be read from a JSON object.
fn object_only<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> Deserialize<'a>,
{
    let raw = Value::deserialize(deserializer)?;
    if !raw.is_object() {
        return Err(D::Error::custom("expected an object"));
    }
    T::deserialize(&raw).map_err(D::Error::custom)
}

/// A field group keyed on presence: a falsy value means the shape is absent,
/// an object is read by name, anything else truthy reads as all zeros.
fn truthy_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + for<'a> Deserialize<'a>,
{
    let raw = Value::deserialize(deserializer)?;
    if !is_truthy(&raw) {
        return Err(D::Error::custom("field is empty"));
    }
    if !raw.is_object() {
        return Ok(T::default());
    }
    T::deserialize(&raw).map_err(D::Error::custom)
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_summary<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<MealSummary>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(MealSummary::deserialize(&raw).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_number_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_number(&json!(12.5)), 12.5);
        assert_eq!(coerce_number(&json!(" 42 ")), 42.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!("about 40")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!({"value": 3})), 0.0);
        assert_eq!(coerce_number(&json!("NaN")), 0.0);
        assert_eq!(coerce_number(&json!("inf")), 0.0);
    }

    #[test]
    fn mixed_fields_respect_key_priority() {
        let fields: MixedFields =
            serde_json::from_value(json!({"calories_kcal": 0, "calories": 300, "protein_g": 10, "protein": 99}))
                .unwrap();
        let suffixed = fields.suffixed_first();
        assert_eq!(suffixed.calories, 300.0);
        assert_eq!(suffixed.protein, 10.0);

        let bare = fields.bare_first();
        assert_eq!(bare.protein, 99.0);
    }

    #[test]
    fn output_totals_requires_a_totals_object() {
        assert!(serde_json::from_value::<OutputTotalsDoc>(json!({"output": {"totals": null}})).is_err());
        assert!(serde_json::from_value::<OutputTotalsDoc>(json!({"output": {"items": []}})).is_err());
        assert!(serde_json::from_value::<OutputTotalsDoc>(json!({"output": {"totals": {}}})).is_ok());
    }

    #[test]
    fn malformed_meal_summary_is_ignored() {
        let doc: OutputTotalsDoc = serde_json::from_value(json!({
            "output": {"totals": {"calories_kcal": 10}, "mealSummary": "great"}
        }))
        .unwrap();
        assert!(doc.output.meal_summary.is_none());
    }

    #[test]
    fn array_totals_are_not_read_positionally() {
        let doc: OutputTotalsDoc =
            serde_json::from_value(json!({"output": {"totals": [1040, 41, 90, 59]}})).unwrap();
        assert!(doc.output.totals.macros().is_zero());

        let doc: TotalsDoc = serde_json::from_value(json!({"totals": [610, 1, 25]})).unwrap();
        assert!(doc.totals.suffixed_first().is_zero());

        assert!(serde_json::from_value::<OutputTotalsDoc>(json!({"output": [{"totals": {}}]})).is_err());
    }

    #[test]
    fn falsy_totals_mean_the_shape_is_absent() {
        assert!(serde_json::from_value::<TotalsDoc>(json!({"totals": 0})).is_err());
        assert!(serde_json::from_value::<TotalsDoc>(json!({"totals": ""})).is_err());
        assert!(serde_json::from_value::<OutputTotalsDoc>(json!({"output": {"totals": false}})).is_err());
    }

    #[test]
    fn truthiness_follows_javascript() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy}");
        }
        for truthy in [json!(true), json!(-1), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy}");
        }
    }

    #[test]
    fn items_sum_skips_non_objects() {
        let items: OutputItems = serde_json::from_value(json!({
            "items": [{"calories_kcal": 100, "fat_g": "2.5"}, "noise", [300, 18, 16, 18], {"calories_kcal": 50}]
        }))
        .unwrap();
        let macros = items.macros();
        assert_eq!(macros.calories, 150.0);
        assert_eq!(macros.fat, 2.5);
    }
}

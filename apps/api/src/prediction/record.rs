//! Property records: the raw attribute map a caller submits, plus the typed
//! defaults used by the simplified endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

pub const NUMERIC_FIELDS: [&str; 5] = ["area", "bedrooms", "bathrooms", "stories", "parking"];

pub const CATEGORICAL_FIELDS: [&str; 7] = [
    "mainroad",
    "guestroom",
    "basement",
    "hotwaterheating",
    "airconditioning",
    "prefarea",
    "furnishingstatus",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Invalid numeric value for {0}")]
    InvalidNumber(String),
}

/// Attribute name → value, as submitted. Keys outside the known fields are
/// kept so they can be echoed back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyRecord(Map<String, Value>);

impl PropertyRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the value for `field`, treating `null` as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts every numeric field present in the record to a JSON float.
    /// Absent fields are left absent.
    pub fn coerce_numeric_fields(&mut self) -> Result<(), RecordError> {
        for field in NUMERIC_FIELDS {
            let Some(value) = self.get(field) else {
                continue;
            };
            let number = value_to_f64(value)
                .and_then(Number::from_f64)
                .ok_or_else(|| RecordError::InvalidNumber(field.to_string()))?;
            self.0.insert(field.to_string(), Value::Number(number));
        }
        Ok(())
    }
}

/// Finite float from a JSON number, numeric string or bool.
pub fn value_to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Integer from a JSON number (truncated toward zero), integer string or bool.
pub fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite() && v.abs() < i64::MAX as f64)
                .map(|v| v.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// The category label of a value: strings as-is, anything else by its JSON text.
pub fn value_to_category(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationQuality {
    Good,
    Standard,
}

/// A fully-defaulted property for the simplified endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleProperty {
    pub area: f64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub stories: i64,
    pub mainroad: String,
    pub guestroom: String,
    pub basement: String,
    pub hotwaterheating: String,
    pub airconditioning: String,
    pub parking: i64,
    pub prefarea: String,
    pub furnishingstatus: String,
}

impl Default for SimpleProperty {
    fn default() -> Self {
        Self {
            area: 1000.0,
            bedrooms: 3,
            bathrooms: 2,
            stories: 1,
            mainroad: "yes".to_string(),
            guestroom: "no".to_string(),
            basement: "no".to_string(),
            hotwaterheating: "no".to_string(),
            airconditioning: "no".to_string(),
            parking: 1,
            prefarea: "no".to_string(),
            furnishingstatus: "unfurnished".to_string(),
        }
    }
}

impl SimpleProperty {
    /// Fills every field from `record`, falling back to the defaults for
    /// absent ones.
    pub fn from_record(record: &PropertyRecord) -> Result<Self, RecordError> {
        let defaults = Self::default();

        let float = |field: &str, default: f64| -> Result<f64, RecordError> {
            match record.get(field) {
                None => Ok(default),
                Some(v) => value_to_f64(v).ok_or_else(|| RecordError::InvalidNumber(field.to_string())),
            }
        };
        let int = |field: &str, default: i64| -> Result<i64, RecordError> {
            match record.get(field) {
                None => Ok(default),
                Some(v) => value_to_i64(v).ok_or_else(|| RecordError::InvalidNumber(field.to_string())),
            }
        };
        let category = |field: &str, default: String| -> String {
            record.get(field).map(value_to_category).unwrap_or(default)
        };

        Ok(Self {
            area: float("area", defaults.area)?,
            bedrooms: int("bedrooms", defaults.bedrooms)?,
            bathrooms: int("bathrooms", defaults.bathrooms)?,
            stories: int("stories", defaults.stories)?,
            mainroad: category("mainroad", defaults.mainroad),
            guestroom: category("guestroom", defaults.guestroom),
            basement: category("basement", defaults.basement),
            hotwaterheating: category("hotwaterheating", defaults.hotwaterheating),
            airconditioning: category("airconditioning", defaults.airconditioning),
            parking: int("parking", defaults.parking)?,
            prefarea: category("prefarea", defaults.prefarea),
            furnishingstatus: category("furnishingstatus", defaults.furnishingstatus),
        })
    }

    pub fn location_quality(&self) -> LocationQuality {
        if self.prefarea == "yes" {
            LocationQuality::Good
        } else {
            LocationQuality::Standard
        }
    }

    pub fn to_record(&self) -> PropertyRecord {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => PropertyRecord(map),
            // a struct of plain fields always serializes to an object
            _ => PropertyRecord::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> PropertyRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_coerce_accepts_numbers_and_numeric_strings() {
        let mut r = record(json!({"area": "7420", "bedrooms": 4, "parking": " 2 "}));
        r.coerce_numeric_fields().unwrap();
        assert_eq!(r.get("area"), Some(&json!(7420.0)));
        assert_eq!(r.get("bedrooms"), Some(&json!(4.0)));
        assert_eq!(r.get("parking"), Some(&json!(2.0)));
        assert_eq!(r.get("stories"), None);
    }

    #[test]
    fn test_coerce_rejects_non_numeric_value() {
        let mut r = record(json!({"area": "big"}));
        let err = r.coerce_numeric_fields().unwrap_err();
        assert_eq!(err.to_string(), "Invalid numeric value for area");
    }

    #[test]
    fn test_coerce_rejects_non_finite_value() {
        let mut r = record(json!({"bathrooms": "NaN"}));
        assert_eq!(
            r.coerce_numeric_fields(),
            Err(RecordError::InvalidNumber("bathrooms".to_string()))
        );
    }

    #[test]
    fn test_coerce_keeps_categorical_and_extra_fields() {
        let mut r = record(json!({"mainroad": "yes", "note": "corner lot"}));
        r.coerce_numeric_fields().unwrap();
        assert_eq!(r.get("mainroad"), Some(&json!("yes")));
        assert_eq!(r.get("note"), Some(&json!("corner lot")));
    }

    #[test]
    fn test_null_is_treated_as_absent() {
        let mut r = record(json!({"area": null}));
        r.coerce_numeric_fields().unwrap();
        assert_eq!(r.get("area"), None);
    }

    #[test]
    fn test_value_to_i64_truncates_floats() {
        assert_eq!(value_to_i64(&json!(3.9)), Some(3));
        assert_eq!(value_to_i64(&json!(-2.5)), Some(-2));
        assert_eq!(value_to_i64(&json!("4")), Some(4));
        assert_eq!(value_to_i64(&json!("4.5")), None);
        assert_eq!(value_to_i64(&json!([1])), None);
    }

    #[test]
    fn test_simple_property_defaults_from_empty_record() {
        let p = SimpleProperty::from_record(&PropertyRecord::new()).unwrap();
        assert_eq!(p, SimpleProperty::default());
        assert_eq!(p.area, 1000.0);
        assert_eq!(p.bedrooms, 3);
        assert_eq!(p.bathrooms, 2);
        assert_eq!(p.stories, 1);
        assert_eq!(p.mainroad, "yes");
        assert_eq!(p.parking, 1);
        assert_eq!(p.furnishingstatus, "unfurnished");
        assert_eq!(p.location_quality(), LocationQuality::Standard);
    }

    #[test]
    fn test_simple_property_overrides_given_fields() {
        let p = SimpleProperty::from_record(&record(json!({
            "area": "2500",
            "bedrooms": 5,
            "prefarea": "yes",
        })))
        .unwrap();
        assert_eq!(p.area, 2500.0);
        assert_eq!(p.bedrooms, 5);
        assert_eq!(p.bathrooms, 2);
        assert_eq!(p.location_quality(), LocationQuality::Good);
    }

    #[test]
    fn test_simple_property_rejects_fractional_integer_string() {
        let err = SimpleProperty::from_record(&record(json!({"stories": "1.5"}))).unwrap_err();
        assert_eq!(err, RecordError::InvalidNumber("stories".to_string()));
    }

    #[test]
    fn test_simple_property_to_record_has_all_fields() {
        let r = SimpleProperty::default().to_record();
        assert_eq!(r.len(), NUMERIC_FIELDS.len() + CATEGORICAL_FIELDS.len());
        assert_eq!(r.get("area"), Some(&json!(1000.0)));
        assert_eq!(r.get("bedrooms"), Some(&json!(3)));
    }

    #[test]
    fn test_non_string_category_uses_json_text() {
        assert_eq!(value_to_category(&json!("yes")), "yes");
        assert_eq!(value_to_category(&json!(1)), "1");
        assert_eq!(value_to_category(&json!(true)), "true");
    }
}

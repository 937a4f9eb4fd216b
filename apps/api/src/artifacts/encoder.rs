//! Categorical label encoders.
//!
//! Each encoder is the JSON export of a fitted label encoder: an ordered list
//! of classes, where a value encodes to its index in that list.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// What to do with a categorical value the encoder never saw during fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownCategoryPolicy {
    /// Substitute a fixed code. The default substitutes `0`, the code of the
    /// first (lexicographically smallest) class.
    DefaultCode(u32),
}

impl Default for UnknownCategoryPolicy {
    fn default() -> Self {
        UnknownCategoryPolicy::DefaultCode(0)
    }
}

/// Outcome of encoding one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoded {
    Known(f64),
    /// The value was not a known class; carries the substituted code.
    Substituted(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn transform(&self, value: &str) -> Option<f64> {
        self.classes
            .iter()
            .position(|c| c == value)
            .map(|idx| idx as f64)
    }

    /// Encodes `value`, falling back to `policy` for unseen categories.
    pub fn transform_or(&self, value: &str, policy: UnknownCategoryPolicy) -> Encoded {
        match self.transform(value) {
            Some(code) => Encoded::Known(code),
            None => match policy {
                UnknownCategoryPolicy::DefaultCode(code) => Encoded::Substituted(code as f64),
            },
        }
    }
}

/// Per-column encoders, kept in the order the columns appear in the export.
#[derive(Debug, Clone, Default)]
pub struct Encoders(Vec<(String, LabelEncoder)>);

impl Encoders {
    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, encoder)| encoder)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, LabelEncoder)> for Encoders {
    fn from_iter<I: IntoIterator<Item = (String, LabelEncoder)>>(iter: I) -> Self {
        Encoders(iter.into_iter().collect())
    }
}

impl Serialize for Encoders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (column, encoder) in &self.0 {
            map.serialize_entry(column, encoder)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Encoders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EncodersVisitor)
    }
}

struct EncodersVisitor;

impl<'de> Visitor<'de> for EncodersVisitor {
    type Value = Encoders;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of column name to label encoder")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Encoders, A::Error> {
        let mut columns: Vec<(String, LabelEncoder)> =
            Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((column, encoder)) = access.next_entry::<String, LabelEncoder>()? {
            if columns.iter().any(|(name, _)| *name == column) {
                return Err(de::Error::custom(format!(
                    "duplicate encoder column '{column}'"
                )));
            }
            columns.push((column, encoder));
        }
        Ok(Encoders(columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes_no() -> LabelEncoder {
        LabelEncoder::new(vec!["no".to_string(), "yes".to_string()])
    }

    #[test]
    fn test_known_value_encodes_to_class_index() {
        assert_eq!(yes_no().transform("no"), Some(0.0));
        assert_eq!(yes_no().transform("yes"), Some(1.0));
    }

    #[test]
    fn test_unknown_value_uses_default_code() {
        let encoded = yes_no().transform_or("maybe", UnknownCategoryPolicy::default());
        assert_eq!(encoded, Encoded::Substituted(0.0));
    }

    #[test]
    fn test_custom_default_code() {
        let encoded = yes_no().transform_or("YES", UnknownCategoryPolicy::DefaultCode(1));
        assert_eq!(encoded, Encoded::Substituted(1.0));
    }

    #[test]
    fn test_encoders_deserialize_from_column_map() {
        let json = r#"{
            "mainroad": {"classes": ["no", "yes"]},
            "furnishingstatus": {"classes": ["furnished", "semi-furnished", "unfurnished"]}
        }"#;
        let encoders: Encoders = serde_json::from_str(json).unwrap();
        assert_eq!(encoders.len(), 2);
        assert_eq!(
            encoders.get("furnishingstatus").unwrap().transform("unfurnished"),
            Some(2.0)
        );
        // columns keep the order they were exported in
        let cols: Vec<&str> = encoders.columns().collect();
        assert_eq!(cols, vec!["mainroad", "furnishingstatus"]);
    }

    #[test]
    fn test_serialized_encoders_keep_column_order() {
        let encoders: Encoders = [
            ("prefarea".to_string(), yes_no()),
            ("basement".to_string(), yes_no()),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&encoders).unwrap();
        let back: Encoders = serde_json::from_str(&json).unwrap();
        assert_eq!(back.columns().collect::<Vec<_>>(), vec!["prefarea", "basement"]);
    }

    #[test]
    fn test_duplicate_encoder_column_is_rejected() {
        let json = r#"{"mainroad": {"classes": ["no"]}, "mainroad": {"classes": ["yes"]}}"#;
        let err = serde_json::from_str::<Encoders>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate encoder column 'mainroad'"));
    }
}

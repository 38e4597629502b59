//! Field-level document decoding policies.
//!
//! # Responsibility
//! - Map typed records to raw document fields and back.
//! - Offer two read policies: lenient (per-field defaults) for single-record
//!   reads, strict (whole-record rejection) for list reads.
//!
//! # Invariants
//! - Lenient accessors never fail; a missing or mistyped field yields the
//!   type default (`""`, `[]`, `0`, `false`).
//! - Strict accessors return `None` for missing or mistyped fields.

use crate::store::Document;
use serde_json::Value;

/// Encoding and decoding rules for one record type.
pub trait DocumentCodec: Sized + Send + Sync + 'static {
    /// Enumerated fields written by create/upsert paths.
    fn encode(&self) -> Document;

    /// Decodes with per-field defaults. Never fails.
    fn decode_lenient(fields: &FieldReader<'_>) -> Self;

    /// Decodes only when every required field is present and well-typed.
    fn decode_strict(fields: &FieldReader<'_>) -> Option<Self>;

    /// Rejects values that cannot be written faithfully.
    ///
    /// Called before every create/upsert; the default accepts everything.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Read-only typed view over one document body.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    data: &'a Document,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a Document) -> Self {
        Self { data }
    }

    /// Whether the field exists, whatever its type.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn string(&self, key: &str) -> String {
        self.require_string(key).unwrap_or_default()
    }

    /// A list holding any non-string element decodes as empty.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.require_string_list(key).unwrap_or_default()
    }

    pub fn number(&self, key: &str) -> f64 {
        self.require_number(key).unwrap_or_default()
    }

    pub fn flag(&self, key: &str) -> bool {
        self.data
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    pub fn require_string(&self, key: &str) -> Option<String> {
        self.data.get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn require_string_list(&self, key: &str) -> Option<Vec<String>> {
        self.data
            .get(key)?
            .as_array()?
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect()
    }

    /// Integer or float.
    pub fn require_number(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(Value::as_f64)
    }

    /// Accepts integral floats (`3.0`) and rejects fractional ones (`3.5`).
    pub fn require_integer(&self, key: &str) -> Option<i64> {
        let value = self.data.get(key)?;
        if let Some(int) = value.as_i64() {
            return Some(int);
        }
        let float = value.as_f64()?;
        if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
            Some(float as i64)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FieldReader;
    use crate::store::Document;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn lenient_accessors_fall_back_to_defaults() {
        let data = doc(json!({"name": 7, "schools": "not a list", "rating": "high"}));
        let fields = FieldReader::new(&data);

        assert_eq!(fields.string("name"), "");
        assert_eq!(fields.string("missing"), "");
        assert!(fields.string_list("schools").is_empty());
        assert_eq!(fields.number("rating"), 0.0);
        assert!(!fields.flag("featured"));
    }

    #[test]
    fn mixed_list_decodes_as_empty() {
        let data = doc(json!({"schools": ["MIT", 3]}));
        let fields = FieldReader::new(&data);

        assert!(fields.string_list("schools").is_empty());
        assert_eq!(fields.require_string_list("schools"), None);
    }

    #[test]
    fn number_accepts_integers() {
        let data = doc(json!({"rating": 4}));
        assert_eq!(FieldReader::new(&data).number("rating"), 4.0);
    }

    #[test]
    fn require_integer_accepts_only_integral_values() {
        let data = doc(json!({"a": 12, "b": 3.0, "c": 3.5, "d": "12"}));
        let fields = FieldReader::new(&data);

        assert_eq!(fields.require_integer("a"), Some(12));
        assert_eq!(fields.require_integer("b"), Some(3));
        assert_eq!(fields.require_integer("c"), None);
        assert_eq!(fields.require_integer("d"), None);
        assert_eq!(fields.require_integer("missing"), None);
    }
}

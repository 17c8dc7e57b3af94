//! Field values handed to the evaluator.
//!
//! The evaluator never looks inside records itself. A [`FieldGetter`]
//! supplied by the caller maps a record and a field name to a [`FieldValue`],
//! and each operator checks that the value has the type it expects.
//!
//! [`FieldGetter`]: crate::filter::FieldGetter

use serde_json::Value;

use crate::filter::{Expr, FieldGetter, WILDCARD};

/// A dynamically typed field value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    /// Missing or unsupported value. Matches no operator.
    #[default]
    Null,
    /// Read by boolean operators.
    Bool(bool),
    /// Read by numeric operators.
    Number(f64),
    /// Read by categorical and text operators.
    String(String),
    /// Read by set operators.
    List(Vec<String>),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl From<&Value> for FieldValue {
    /// Converts a JSON value. Arrays become [`FieldValue::List`] only when every
    /// element is a string; objects, `null` and mixed arrays become [`FieldValue::Null`].
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
            Value::String(s) => FieldValue::String(s.clone()),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map_or(FieldValue::Null, FieldValue::List),
            Value::Null | Value::Object(_) => FieldValue::Null,
        }
    }
}

/// What the wildcard target `*` reads from a JSON record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WildcardSource {
    /// Every top-level string, and every string inside top-level arrays, joined by spaces.
    #[default]
    AllText,
    /// The value of one named field.
    Field(String),
}

/// Default field getter for `serde_json::Value` records.
///
/// Returns `record[field]` converted with `FieldValue::from`; the wildcard is
/// resolved through its [`WildcardSource`].
#[derive(Debug, Clone, Default)]
pub struct JsonFieldGetter {
    wildcard: WildcardSource,
}

impl JsonFieldGetter {
    /// Creates a getter whose wildcard reads all text in the record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets what the wildcard target reads.
    pub fn with_wildcard(mut self, wildcard: WildcardSource) -> Self {
        self.wildcard = wildcard;
        self
    }

    /// Makes the wildcard target read one field.
    pub fn with_wildcard_field(self, field: impl Into<String>) -> Self {
        self.with_wildcard(WildcardSource::Field(field.into()))
    }

    /// Returns the configured wildcard source.
    pub fn wildcard(&self) -> &WildcardSource {
        &self.wildcard
    }
}

impl FieldGetter<Value> for JsonFieldGetter {
    fn get(&self, record: &Value, field: &str, _expr: &Expr) -> FieldValue {
        if field != WILDCARD {
            return record.get(field).map(FieldValue::from).unwrap_or_default();
        }

        match &self.wildcard {
            WildcardSource::AllText => FieldValue::String(all_text(record)),
            WildcardSource::Field(name) => {
                record.get(name).map(FieldValue::from).unwrap_or_default()
            }
        }
    }
}

/// Joins the text of a record for free-text search.
fn all_text(record: &Value) -> String {
    let values: Vec<&Value> = match record {
        Value::Object(map) => map.values().collect(),
        other => vec![other],
    };

    let mut pieces: Vec<&str> = Vec::new();
    for value in values {
        match value {
            Value::String(s) => pieces.push(s),
            Value::Array(items) => pieces.extend(items.iter().filter_map(Value::as_str)),
            _ => {}
        }
    }
    pieces.join(" ")
}

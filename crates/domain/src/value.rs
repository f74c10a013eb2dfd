//! Live values of a form being filled in.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::FieldId;
use crate::schema::FieldType;

/// Current value of every field in a form-filling session.
pub type ValueMap = BTreeMap<FieldId, FieldValue>;

/// At most one validation message per field; absent means valid.
pub type ErrorMap = BTreeMap<FieldId, String>;

/// A single field value.
///
/// Serialized untagged, so the JSON is the bare leaf: `"text"`, `42`, `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Whether the value counts as "not provided" for the required rule.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.is_empty(),
            FieldValue::Boolean(value) => !value,
            FieldValue::Number(value) => value.is_nan(),
        }
    }

    /// Character count for text values. Other kinds have no length.
    pub fn char_len(&self) -> Option<usize> {
        self.as_str().map(|value| value.chars().count())
    }

    /// Parse a stored default (always a string) into the value kind the field holds.
    ///
    /// Returns `None` when there is nothing meaningful to seed.
    pub fn from_default(field_type: FieldType, raw: &str) -> Option<Self> {
        match field_type {
            FieldType::Checkbox => match raw.trim() {
                "true" => Some(FieldValue::Boolean(true)),
                "false" | "" => Some(FieldValue::Boolean(false)),
                _ => None,
            },
            FieldType::Number => {
                if raw.trim().is_empty() {
                    None
                } else {
                    raw.trim()
                        .parse::<f64>()
                        .ok()
                        .map(FieldValue::Number)
                        .or_else(|| Some(FieldValue::text(raw)))
                }
            }
            _ if raw.is_empty() => None,
            _ => Some(FieldValue::text(raw)),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Boolean(value) => write!(f, "{}", value),
            FieldValue::Number(value) => write!(f, "{}", value),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

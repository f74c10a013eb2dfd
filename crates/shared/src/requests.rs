//! Request bodies for the HTTP API.
//!
//! Field edits (`PATCH .../fields/{index}` and `POST .../edit/commit`) take a
//! [`FieldPatch`](formcraft_domain::FieldPatch) body directly.

use formcraft_domain::{FieldType, FormField, ValueMap};
use serde::{Deserialize, Serialize};

/// Save a complete form definition without going through a builder session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFormRequest {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

/// Make the saved form at `index` the current form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectFormRequest {
    pub index: usize,
}

/// Live values of a fill-in form, used by evaluate and submit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValuesRequest {
    #[serde(default)]
    pub values: ValueMap,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFieldRequest {
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Replace the draft's field list with `fields`, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderFieldsRequest {
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFormNameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginEditRequest {
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcraft_domain::FieldValue;

    #[test]
    fn add_field_uses_type_key() {
        let request: AddFieldRequest = serde_json::from_str(r#"{"type":"radio"}"#).unwrap();
        assert_eq!(request.field_type, FieldType::Radio);
    }

    #[test]
    fn values_request_accepts_mixed_leaves() {
        let request: FormValuesRequest =
            serde_json::from_str(r#"{"values":{"a":2,"b":"x","c":true}}"#).unwrap();
        assert_eq!(request.values.get("a"), Some(&FieldValue::Number(2.0)));
        assert_eq!(request.values.get("b"), Some(&FieldValue::text("x")));
        assert_eq!(request.values.get("c"), Some(&FieldValue::Boolean(true)));

        let empty: FormValuesRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.values.is_empty());
    }

    #[test]
    fn save_request_defaults_to_no_fields() {
        let request: SaveFormRequest = serde_json::from_str(r#"{"name":"Signup"}"#).unwrap();
        assert_eq!(request.name, "Signup");
        assert!(request.fields.is_empty());
    }
}

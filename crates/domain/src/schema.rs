//! Form Schema Types
//!
//! This module defines the declarative description of a form: the typed fields
//! a user fills in, the validation rules attached to each field, and optional
//! derivations that compute a field's value from other fields.
//!
//! # Wire Format
//!
//! The JSON shape is stable and shared with the persistence layer:
//!
//! - Schema: `name`, `createdAt`, `fields`
//! - Field: `id`, `label`, `type`, `defaultValue`, `options`, `validations`, `derived`
//! - Rules: `required`, `minLength`, `maxLength`, `isEmail`, `isPassword`, `pattern`
//! - Derivation: `parentFields`, `formula`
//!
//! # Design Philosophy
//!
//! - **Ordered fields**: field order is both edit order and render order
//! - **Snapshots**: a saved [`FormSchema`] is never a live view of a builder draft
//! - **Issues, not panics**: malformed definitions are reported as [`DefinitionError`]s

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DomainError;
use crate::formula::Formula;
use crate::ids::FieldId;

/// Label given to freshly created fields.
pub const DEFAULT_FIELD_LABEL: &str = "New Field";

// =============================================================================
// Field Types
// =============================================================================

/// Kind of input a field collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Email,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
        FieldType::Email,
    ];

    /// Wire name of the type (e.g. `"textarea"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::Email => "email",
        }
    }

    /// Whether the field picks one value from `options`.
    pub fn requires_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        FieldType::ALL
            .into_iter()
            .find(|field_type| field_type.as_str() == wanted)
            .ok_or_else(|| DomainError::parse(format!("Unknown field type: {}", s)))
    }
}

// =============================================================================
// Validation Rules
// =============================================================================

/// Validation rules for a field.
///
/// Every rule is optional. A length bound of `None` is "not configured";
/// `Some(0)` is a configured bound that no input can violate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub is_email: bool,
    #[serde(default)]
    pub is_password: bool,
    /// Carried with the definition but not evaluated by the rule engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ValidationRules {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_email(mut self) -> Self {
        self.is_email = true;
        self
    }

    pub fn with_password(mut self) -> Self {
        self.is_password = true;
        self
    }
}

// =============================================================================
// Derived Fields
// =============================================================================

/// Definition of a calculated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedField {
    /// Fields the formula may read, in binding order
    pub parent_fields: Vec<FieldId>,
    /// Arithmetic expression over the parent bindings
    pub formula: String,
}

impl DerivedField {
    pub fn new(
        parent_fields: impl IntoIterator<Item = impl Into<FieldId>>,
        formula: impl Into<String>,
    ) -> Self {
        Self {
            parent_fields: parent_fields.into_iter().map(Into::into).collect(),
            formula: formula.into(),
        }
    }

    pub fn depends_on(&self, id: &FieldId) -> bool {
        self.parent_fields.contains(id)
    }
}

// =============================================================================
// Field Definitions
// =============================================================================

/// Definition of a single field in a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Unique field identifier, stable for the field's lifetime
    pub id: FieldId,
    /// Display label
    pub label: String,
    /// Input kind
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Initial value shown when a form is opened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Choices for select/radio fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<ValidationRules>,
    /// If set, the value is computed and never entered directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedField>,
}

impl FormField {
    /// Create a field with a freshly generated id.
    pub fn create(field_type: FieldType) -> Self {
        Self::with_id(FieldId::generate(), field_type)
    }

    /// Create a field with builder defaults and the given id.
    pub fn with_id(id: FieldId, field_type: FieldType) -> Self {
        Self {
            id,
            label: DEFAULT_FIELD_LABEL.to_string(),
            field_type,
            default_value: Some(String::new()),
            options: Vec::new(),
            validations: Some(ValidationRules::default()),
            derived: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_validations(mut self, validations: ValidationRules) -> Self {
        self.validations = Some(validations);
        self
    }

    pub fn with_derived(mut self, derived: DerivedField) -> Self {
        self.derived = Some(derived);
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn is_derived(&self) -> bool {
        self.derived.is_some()
    }

    /// Merge a partial description into this field. The id never changes.
    pub fn apply(&mut self, patch: FieldPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(field_type) = patch.field_type {
            self.field_type = field_type;
        }
        if let Some(default_value) = patch.default_value {
            self.default_value = Some(default_value);
        }
        if let Some(options) = patch.options {
            self.options = options;
        }
        if let Some(validations) = patch.validations {
            self.validations = Some(validations);
        }
        if patch.clear_derived {
            self.derived = None;
        }
        if let Some(derived) = patch.derived {
            self.derived = Some(derived);
        }
    }
}

/// Partial field description used by edit operations.
///
/// Absent members leave the field untouched. `clearDerived` turns a derived
/// field back into a regular input (applied before `derived`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub validations: Option<ValidationRules>,
    #[serde(default)]
    pub derived: Option<DerivedField>,
    #[serde(default)]
    pub clear_derived: bool,
}

impl FieldPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// Form Schema
// =============================================================================

/// A saved, immutable form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub fields: Vec<FormField>,
}

impl FormSchema {
    /// Snapshot a named field list.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `name` is blank.
    pub fn new(
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        fields: Vec<FormField>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("Form name cannot be empty"));
        }
        Ok(Self {
            name,
            created_at,
            fields,
        })
    }

    pub fn field(&self, id: &FieldId) -> Option<&FormField> {
        self.fields.iter().find(|field| &field.id == id)
    }

    pub fn derived_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|field| field.is_derived())
    }

    /// Every definition problem in the schema, in field order.
    pub fn definition_issues(&self) -> Vec<DefinitionError> {
        definition_issues(&self.fields)
    }
}

// =============================================================================
// Definition Checks
// =============================================================================

/// A malformed part of a form definition. Never fatal; the form stays editable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("Field '{field_id}' is a {field_type} field without options")]
    MissingOptions {
        field_id: FieldId,
        field_type: FieldType,
    },

    #[error("Field id '{0}' is used more than once")]
    DuplicateId(FieldId),

    #[error("Field '{field_id}' has minLength {min} greater than maxLength {max}")]
    InvertedLengthBounds {
        field_id: FieldId,
        min: usize,
        max: usize,
    },

    #[error("Derived field '{0}' has no parent fields")]
    NoParents(FieldId),

    #[error("Derived field '{field_id}' depends on unknown field '{parent_id}'")]
    UnknownParent {
        field_id: FieldId,
        parent_id: FieldId,
    },

    #[error("Derived field '{field_id}' has an invalid formula: {message}")]
    InvalidFormula { field_id: FieldId, message: String },
}

impl DefinitionError {
    /// The field the issue belongs to.
    pub fn field_id(&self) -> &FieldId {
        match self {
            Self::MissingOptions { field_id, .. }
            | Self::InvertedLengthBounds { field_id, .. }
            | Self::UnknownParent { field_id, .. }
            | Self::InvalidFormula { field_id, .. } => field_id,
            Self::DuplicateId(field_id) | Self::NoParents(field_id) => field_id,
        }
    }
}

/// Check an ordered field list for definition problems.
pub fn definition_issues(fields: &[FormField]) -> Vec<DefinitionError> {
    let mut issues = Vec::new();
    let known: HashSet<&FieldId> = fields.iter().map(|field| &field.id).collect();
    let mut seen = HashSet::new();

    for field in fields {
        if !seen.insert(&field.id) {
            issues.push(DefinitionError::DuplicateId(field.id.clone()));
        }

        if field.field_type.requires_options() && field.options.is_empty() {
            issues.push(DefinitionError::MissingOptions {
                field_id: field.id.clone(),
                field_type: field.field_type,
            });
        }

        if let Some(rules) = &field.validations {
            if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
                if min > max {
                    issues.push(DefinitionError::InvertedLengthBounds {
                        field_id: field.id.clone(),
                        min,
                        max,
                    });
                }
            }
        }

        let Some(derived) = &field.derived else {
            continue;
        };

        if derived.parent_fields.is_empty() {
            issues.push(DefinitionError::NoParents(field.id.clone()));
        }

        for parent_id in &derived.parent_fields {
            if !known.contains(parent_id) {
                issues.push(DefinitionError::UnknownParent {
                    field_id: field.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }

        match Formula::parse(&derived.formula) {
            Ok(formula) => {
                if let Err(err) = formula.check_bindings(&derived.parent_fields) {
                    issues.push(DefinitionError::InvalidFormula {
                        field_id: field.id.clone(),
                        message: err.to_string(),
                    });
                }
            }
            Err(err) => issues.push(DefinitionError::InvalidFormula {
                field_id: field.id.clone(),
                message: err.to_string(),
            }),
        }
    }

    issues
}

// =============================================================================
// Tests
// =============================================================================

//! Formcraft domain: form schemas, field values, validation and derived fields.
//!
//! Everything in this crate is pure. Persistence, sessions and the HTTP
//! surface live in `formcraft-engine`.

pub mod derivation;
pub mod error;
pub mod formula;
pub mod ids;
pub mod schema;
pub mod validation;
pub mod value;

pub use derivation::{recompute_derived, Derivation, DerivationError};
pub use error::DomainError;
pub use formula::{Formula, FormulaError};
pub use ids::{BuilderSessionId, FieldId};
pub use schema::{
    definition_issues, DefinitionError, DerivedField, FieldPatch, FieldType, FormField,
    FormSchema, ValidationRules, DEFAULT_FIELD_LABEL,
};
pub use validation::{validate_field, validate_form, RuleViolation};
pub use value::{ErrorMap, FieldValue, ValueMap};

//! Fill-in session errors.

use formcraft_domain::{ErrorMap, FieldId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Field not found: {0}")]
    UnknownField(FieldId),

    #[error("Field {0} is computed and cannot be set directly")]
    DerivedField(FieldId),

    #[error("Form has {} invalid field(s)", .0.len())]
    Invalid(ErrorMap),
}

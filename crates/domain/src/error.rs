//! Errors raised while constructing form definitions.
//!
//! Rule violations on entered values are not errors: they land in an
//! [`ErrorMap`](crate::ErrorMap). Derivation and formula failures have their
//! own types in [`derivation`](crate::derivation) and [`formula`](crate::formula).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A definition breaks an invariant, e.g. a blank form name
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Text does not name a known value, e.g. an unknown field type
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// For `FromStr` implementations.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("Form name cannot be empty");
        assert_eq!(err, DomainError::Validation("Form name cannot be empty".into()));
        assert_eq!(err.to_string(), "Validation failed: Form name cannot be empty");
    }

    #[test]
    fn test_parse_error() {
        let err = DomainError::parse("Unknown field type: slider");
        assert_eq!(err.to_string(), "Parse error: Unknown field type: slider");
    }
}

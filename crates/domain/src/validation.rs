//! Field validation rules.
//!
//! Rules run in a fixed order and stop at the first violation, so a field
//! reports at most one message:
//!
//! 1. `required`
//! 2. `minLength`
//! 3. `maxLength`
//! 4. `isEmail`
//! 5. `isPassword`
//!
//! Length and pattern rules only look at text values; numbers and booleans
//! pass through them untouched.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::schema::{FormField, FormSchema, ValidationRules};
use crate::value::{ErrorMap, FieldValue, ValueMap};

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_MESSAGE: &str = "Invalid email";
pub const PASSWORD_MESSAGE: &str = "Password must be 8+ chars & include number";

/// Minimum password length in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Which rule a value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Email,
    Password,
}

impl RuleViolation {
    pub fn message(&self) -> String {
        match self {
            RuleViolation::Required => REQUIRED_MESSAGE.to_string(),
            RuleViolation::MinLength(min) => format!("Min length is {}", min),
            RuleViolation::MaxLength(max) => format!("Max length is {}", max),
            RuleViolation::Email => EMAIL_MESSAGE.to_string(),
            RuleViolation::Password => PASSWORD_MESSAGE.to_string(),
        }
    }
}

/// Single `@`, something before it, and a dotted domain after it.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// At least eight characters on a single line, at least one of them a digit.
pub fn is_valid_password(value: &str) -> bool {
    let single_line = !value
        .chars()
        .any(|c| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'));
    single_line
        && value.chars().count() >= PASSWORD_MIN_CHARS
        && value.chars().any(|c| c.is_ascii_digit())
}

/// First rule `value` violates, if any. A missing value is treated as empty text.
pub fn check_rules(rules: &ValidationRules, value: Option<&FieldValue>) -> Option<RuleViolation> {
    let empty = FieldValue::default();
    let value = value.unwrap_or(&empty);

    if rules.required && value.is_blank() {
        return Some(RuleViolation::Required);
    }

    // Numbers and booleans have no length and no text shape to check
    let FieldValue::Text(text) = value else {
        return None;
    };
    let len = text.chars().count();

    // A bound of 0 can never be violated, so Some(0) behaves like unset
    if let Some(min) = rules.min_length.filter(|min| *min > 0) {
        if len < min {
            return Some(RuleViolation::MinLength(min));
        }
    }
    if let Some(max) = rules.max_length.filter(|max| *max > 0) {
        if len > max {
            return Some(RuleViolation::MaxLength(max));
        }
    }
    if rules.is_email && !is_valid_email(text) {
        return Some(RuleViolation::Email);
    }
    if rules.is_password && !is_valid_password(text) {
        return Some(RuleViolation::Password);
    }

    None
}

/// Validate one field, returning the message of the first violated rule.
pub fn validate_field(field: &FormField, value: Option<&FieldValue>) -> Option<String> {
    let rules = field.validations.as_ref()?;
    check_rules(rules, value).map(|violation| violation.message())
}

/// Validate every field of `schema` in order. Only failing fields appear.
pub fn validate_form(schema: &FormSchema, values: &ValueMap) -> ErrorMap {
    schema
        .fields
        .iter()
        .filter_map(|field| {
            validate_field(field, values.get(&field.id)).map(|message| (field.id.clone(), message))
        })
        .collect()
}

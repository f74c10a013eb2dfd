//! Fill-in sessions.
//!
//! A [`FormSession`] holds the live values of one form being filled in. Every
//! snapshot recomputes derived fields first and validates the result, so the
//! error map always describes post-derivation values.

mod error;

pub use error::SessionError;

use formcraft_domain::{
    recompute_derived, validate_form, ErrorMap, FieldId, FieldValue, FormSchema, ValueMap,
};

/// Prefix of error-map messages for derived fields that could not be computed.
pub const DERIVATION_FAILED_PREFIX: &str = "Could not compute value";

/// Values and errors at one point in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub values: ValueMap,
    pub errors: ErrorMap,
}

impl SessionSnapshot {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One form being filled in.
#[derive(Debug, Clone)]
pub struct FormSession {
    schema: FormSchema,
    values: ValueMap,
}

impl FormSession {
    /// Start a session with every field at its default value.
    pub fn new(schema: FormSchema) -> Self {
        let values = schema
            .fields
            .iter()
            .filter_map(|field| {
                let raw = field.default_value.as_deref()?;
                let value = FieldValue::from_default(field.field_type, raw)?;
                Some((field.id.clone(), value))
            })
            .collect();
        Self { schema, values }
    }

    /// Start a session from defaults overlaid with `values`.
    ///
    /// Entries for unknown ids are dropped. Entries for derived fields are kept
    /// as their last known value.
    pub fn with_values(schema: FormSchema, values: ValueMap) -> Self {
        let mut session = Self::new(schema);
        for (id, value) in values {
            if session.schema.field(&id).is_some() {
                session.values.insert(id, value);
            } else {
                tracing::debug!(field_id = %id, "Ignoring value for unknown field");
            }
        }
        session
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Record user input for a regular field.
    pub fn set_value(&mut self, id: &FieldId, value: FieldValue) -> Result<(), SessionError> {
        let field = self
            .schema
            .field(id)
            .ok_or_else(|| SessionError::UnknownField(id.clone()))?;
        if field.is_derived() {
            return Err(SessionError::DerivedField(id.clone()));
        }
        self.values.insert(id.clone(), value);
        Ok(())
    }

    /// Recompute derived fields, then validate.
    ///
    /// A derived field that could not be computed keeps its previous value and
    /// is flagged in the error map, unless a rule already reported it.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        let derivation = recompute_derived(&self.schema, &self.values);
        self.values = derivation.values;

        let mut errors = validate_form(&self.schema, &self.values);
        for (field_id, err) in derivation.errors {
            tracing::warn!(
                form_name = %self.schema.name,
                field_id = %field_id,
                error = %err,
                "Derived field could not be computed"
            );
            errors
                .entry(field_id)
                .or_insert_with(|| format!("{}: {}", DERIVATION_FAILED_PREFIX, err));
        }

        SessionSnapshot {
            values: self.values.clone(),
            errors,
        }
    }

    /// Final values if every field passes, otherwise the error map.
    pub fn submit(&mut self) -> Result<ValueMap, SessionError> {
        let snapshot = self.snapshot();
        if snapshot.is_valid() {
            tracing::info!(form_name = %self.schema.name, "Form submitted");
            Ok(snapshot.values)
        } else {
            Err(SessionError::Invalid(snapshot.errors))
        }
    }
}

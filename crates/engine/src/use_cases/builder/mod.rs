//! Form builder.
//!
//! A [`FormBuilder`] owns one editable draft: a form name and an ordered field
//! list. Fields are edited either directly by index or through an edit
//! sub-state (`begin_edit`, `commit_edit`, `cancel_edit`). Structural changes
//! (delete, reorder, reset, save) close an open edit.
//!
//! Saving snapshots the draft into a [`FormSchema`], appends it to the
//! [`FormLibrary`] and starts a fresh draft.

mod error;

pub use error::BuilderError;

use std::sync::Arc;

use formcraft_domain::{
    DefinitionError, FieldId, FieldPatch, FieldType, FormField, FormSchema,
};

use crate::infrastructure::ports::{ClockPort, IdPort};
use crate::repositories::FormLibrary;

/// Where the builder is in its edit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuilderState {
    #[default]
    EditingDraft,
    EditingField { index: usize },
}

/// Editable draft of a form definition.
pub struct FormBuilder {
    name: String,
    fields: Vec<FormField>,
    state: BuilderState,
    ids: Arc<dyn IdPort>,
}

impl FormBuilder {
    pub fn new(ids: Arc<dyn IdPort>) -> Self {
        Self {
            name: String::new(),
            fields: Vec::new(),
            state: BuilderState::EditingDraft,
            ids,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Index of the field in the edit sub-state, if any.
    pub fn editing_index(&self) -> Option<usize> {
        match self.state {
            BuilderState::EditingField { index } => Some(index),
            BuilderState::EditingDraft => None,
        }
    }

    /// Append a new field of `field_type` with a fresh id and default settings.
    pub fn add_field(&mut self, field_type: FieldType) -> &FormField {
        let id = FieldId::from_uuid(self.ids.gen_uuid());
        self.fields.push(FormField::with_id(id, field_type));
        let index = self.fields.len() - 1;
        tracing::debug!(index, field_type = %field_type, "Added field");
        &self.fields[index]
    }

    /// Remove the field at `index`.
    ///
    /// Derived fields that named it as a parent are kept; they show up in
    /// [`definition_issues`](Self::definition_issues) until fixed.
    pub fn delete_field(&mut self, index: usize) -> Result<FormField, BuilderError> {
        self.check_index(index)?;
        let removed = self.fields.remove(index);
        self.state = BuilderState::EditingDraft;

        for dependent in self
            .fields
            .iter()
            .filter(|field| field.derived.as_ref().is_some_and(|d| d.depends_on(&removed.id)))
        {
            tracing::warn!(
                field_id = %dependent.id,
                parent_id = %removed.id,
                "Deleted field is still a parent of a derived field"
            );
        }

        Ok(removed)
    }

    /// Merge `patch` into the field at `index`.
    pub fn update_field(
        &mut self,
        index: usize,
        patch: FieldPatch,
    ) -> Result<&FormField, BuilderError> {
        self.check_index(index)?;
        self.fields[index].apply(patch);
        Ok(&self.fields[index])
    }

    /// Replace the field list wholesale. The caller passes a permutation of
    /// the current fields.
    pub fn reorder_fields(&mut self, fields: Vec<FormField>) {
        if fields.len() != self.fields.len() {
            tracing::warn!(
                before = self.fields.len(),
                after = fields.len(),
                "Reorder changed the number of fields"
            );
        }
        self.fields = fields;
        self.state = BuilderState::EditingDraft;
    }

    pub fn set_form_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Discard the draft.
    pub fn reset_form(&mut self) {
        self.name.clear();
        self.fields.clear();
        self.state = BuilderState::EditingDraft;
    }

    /// Enter the edit sub-state for the field at `index`. An edit already in
    /// progress is dropped.
    pub fn begin_edit(&mut self, index: usize) -> Result<&FormField, BuilderError> {
        self.check_index(index)?;
        self.state = BuilderState::EditingField { index };
        Ok(&self.fields[index])
    }

    /// Apply `patch` to the field being edited and leave the edit sub-state.
    pub fn commit_edit(&mut self, patch: FieldPatch) -> Result<&FormField, BuilderError> {
        let index = self.editing_index().ok_or(BuilderError::NoEditInProgress)?;
        self.state = BuilderState::EditingDraft;
        self.update_field(index, patch)
    }

    /// Leave the edit sub-state without changes.
    pub fn cancel_edit(&mut self) {
        self.state = BuilderState::EditingDraft;
    }

    /// Definition problems in the current draft.
    pub fn definition_issues(&self) -> Vec<DefinitionError> {
        formcraft_domain::definition_issues(&self.fields)
    }

    /// Snapshot the draft, appending it to `library`, then start a new draft.
    ///
    /// With a blank name nothing is written and the draft is left as is. A
    /// storage failure also leaves the draft untouched.
    pub async fn save_form(
        &mut self,
        library: &FormLibrary,
        clock: &dyn ClockPort,
    ) -> Result<FormSchema, BuilderError> {
        if self.name.trim().is_empty() {
            return Err(BuilderError::MissingName);
        }

        let schema = FormSchema::new(self.name.clone(), clock.now(), self.fields.clone())?;
        for issue in schema.definition_issues() {
            tracing::warn!(form_name = %schema.name, issue = %issue, "Saving form with definition issue");
        }

        library.append(schema.clone()).await?;
        self.reset_form();
        Ok(schema)
    }

    fn check_index(&self, index: usize) -> Result<(), BuilderError> {
        if index < self.fields.len() {
            Ok(())
        } else {
            Err(BuilderError::IndexOutOfRange {
                index,
                len: self.fields.len(),
            })
        }
    }
}

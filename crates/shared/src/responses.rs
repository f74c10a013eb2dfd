//! Response bodies for the HTTP API.

use chrono::{DateTime, Utc};
use formcraft_domain::{ErrorMap, FormField, ValueMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Errors
// =============================================================================

/// Error classification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // === Client Errors (4xx) ===
    /// Request was malformed or invalid
    BadRequest,
    /// Requested resource not found
    NotFound,
    /// Submitted values failed validation
    ValidationError,

    // === Server Errors (5xx) ===
    /// Internal server error
    InternalError,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    /// Per-field messages for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorMap>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: ErrorMap) -> Self {
        self.errors = Some(errors);
        self
    }
}

// =============================================================================
// Forms
// =============================================================================

/// One entry of the saved-form list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFormSummary {
    /// Position in the saved list, used to select it
    pub index: usize,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub field_count: usize,
}

/// Post-derivation values and the current error map of a fill-in form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub values: ValueMap,
    pub errors: ErrorMap,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub form_name: String,
    pub values: ValueMap,
}

// =============================================================================
// Builder
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionIssue {
    pub field_id: String,
    pub message: String,
}

/// State of a builder session after each operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderResponse {
    pub id: Uuid,
    pub name: String,
    pub fields: Vec<FormField>,
    /// Index of the field being edited, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editing: Option<usize>,
    #[serde(default)]
    pub issues: Vec<DefinitionIssue>,
}

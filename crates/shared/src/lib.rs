//! Formcraft Shared - wire types for the Formcraft HTTP API
//!
//! This crate contains the request and response bodies exchanged between the
//! engine and its rendering clients.
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - only serde, uuid and chrono
//! 2. **No business logic** - pure data types and serialization
//! 3. **No domain IDs** - builder sessions travel as raw `uuid::Uuid`

pub mod requests;
pub mod responses;

pub use requests::{
    AddFieldRequest, BeginEditRequest, FormValuesRequest, ReorderFieldsRequest,
    SaveFormRequest, SelectFormRequest, SetFormNameRequest,
};
pub use responses::{
    BuilderResponse, DefinitionIssue, ErrorCode, ErrorResponse, EvaluationResponse,
    SavedFormSummary, SubmissionResponse,
};

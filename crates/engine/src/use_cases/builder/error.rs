//! Form builder errors.

use crate::infrastructure::ports::RepoError;
use formcraft_domain::DomainError;

/// Errors that can occur during builder operations.
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("Field index {index} is out of range for {len} fields")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Form name is required")]
    MissingName,

    #[error("No field is being edited")]
    NoEditInProgress,

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

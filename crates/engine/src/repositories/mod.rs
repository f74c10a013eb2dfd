//! Repository modules - Data access wrappers around port traits.
//!
//! Each repository wraps a port trait and provides the interface
//! for use cases to access persisted aggregates.

pub mod form_library;

pub use form_library::{FormLibrary, CURRENT_FORM_KEY, SAVED_FORMS_KEY};

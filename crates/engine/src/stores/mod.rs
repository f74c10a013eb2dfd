//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the database:
//! - `BuilderSessionStore` - open form-builder drafts

pub mod builder_sessions;

pub use builder_sessions::BuilderSessionStore;

//! Use cases - user stories over the domain and the repositories.

pub mod builder;
pub mod session;

pub use builder::{BuilderError, BuilderState, FormBuilder};
pub use session::{FormSession, SessionError, SessionSnapshot};

//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Form storage (could swap SQLite -> anything with get/set by key)
//! - Clock/Ids (for testing)

mod error;
mod repos;
mod testing;

pub use error::RepoError;
pub use repos::KeyValueStore;
pub use testing::{ClockPort, IdPort};

#[cfg(test)]
pub use repos::MockKeyValueStore;
#[cfg(test)]
pub use testing::{MockClockPort, MockIdPort};

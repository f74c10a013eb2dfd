//! Key-value store adapters.
//!
//! - [`SqliteKeyValueStore`] keeps documents in a single SQLite table
//! - [`InMemoryKeyValueStore`] keeps them in a map, for tests and throwaway runs

mod memory;
mod sqlite;

pub use memory::InMemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

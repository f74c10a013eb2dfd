//! Storage ports.

use async_trait::async_trait;
use serde_json::Value;

use super::RepoError;

// =============================================================================
// Key-Value Store
// =============================================================================

/// Durable JSON documents addressed by key.
///
/// Each call is one atomic operation. Writers replace the whole document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the document stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, RepoError>;

    /// Replace the document stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<(), RepoError>;
}

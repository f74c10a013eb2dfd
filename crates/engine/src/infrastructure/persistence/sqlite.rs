//! SQLite-backed key-value storage.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::infrastructure::ports::{ClockPort, KeyValueStore, RepoError};

/// SQLite implementation of the form document store.
///
/// One row per key; the document is kept as JSON text.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteKeyValueStore {
    /// Open (creating if needed) the database at `db_path`.
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("kv_connect", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY NOT NULL,
                value_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("kv_migrate", e))?;

        Ok(Self { pool, clock })
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, RepoError> {
        let row = sqlx::query("SELECT value_json FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("kv_get", e))?;

        match row {
            Some(row) => {
                let json: String = row.get("value_json");
                let value = serde_json::from_str(&json).map_err(RepoError::serialization)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), RepoError> {
        let json = serde_json::to_string(&value).map_err(RepoError::serialization)?;
        let now = self.clock.now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value_json, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value_json = excluded.value_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(json)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("kv_set", e))?;

        tracing::debug!(key = %key, "Stored document");
        Ok(())
    }
}

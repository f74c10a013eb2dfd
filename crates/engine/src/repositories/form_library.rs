//! Saved form definitions.
//!
//! Two documents live in the key-value store:
//! - `savedForms`: every saved [`FormSchema`], oldest first, append-only
//! - `currentForm`: the schema picked for filling in, overwritten on selection

use std::sync::Arc;

use formcraft_domain::FormSchema;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::infrastructure::ports::{KeyValueStore, RepoError};

pub const SAVED_FORMS_KEY: &str = "savedForms";
pub const CURRENT_FORM_KEY: &str = "currentForm";

/// Saved-form operations over the key-value port.
pub struct FormLibrary {
    store: Arc<dyn KeyValueStore>,
    // Serializes the read-modify-write of `savedForms`.
    append_lock: Mutex<()>,
}

impl FormLibrary {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            append_lock: Mutex::new(()),
        }
    }

    /// All saved forms, in save order. Empty if nothing was ever saved.
    pub async fn list(&self) -> Result<Vec<FormSchema>, RepoError> {
        Ok(self.read(SAVED_FORMS_KEY).await?.unwrap_or_default())
    }

    /// Append `schema` to the saved list, returning its index.
    pub async fn append(&self, schema: FormSchema) -> Result<usize, RepoError> {
        let _guard = self.append_lock.lock().await;
        let mut forms = self.list().await?;
        let name = schema.name.clone();
        forms.push(schema);

        let value = serde_json::to_value(&forms).map_err(RepoError::serialization)?;
        self.store.set(SAVED_FORMS_KEY, value).await?;

        let index = forms.len() - 1;
        tracing::info!(form_name = %name, index, "Saved form");
        Ok(index)
    }

    /// Make the saved form at `index` the current form.
    pub async fn select(&self, index: usize) -> Result<FormSchema, RepoError> {
        let schema = self
            .list()
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| RepoError::not_found("Saved form", index))?;

        let value = serde_json::to_value(&schema).map_err(RepoError::serialization)?;
        self.store.set(CURRENT_FORM_KEY, value).await?;

        tracing::info!(form_name = %schema.name, index, "Selected current form");
        Ok(schema)
    }

    /// The form currently selected for filling in.
    pub async fn current(&self) -> Result<Option<FormSchema>, RepoError> {
        self.read(CURRENT_FORM_KEY).await
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RepoError> {
        match self.store.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| RepoError::serialization(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryKeyValueStore;
    use crate::infrastructure::ports::MockKeyValueStore;
    use chrono::{TimeZone, Utc};
    use formcraft_domain::{FieldId, FieldType, FormField};
    use serde_json::json;

    fn schema(name: &str) -> FormSchema {
        FormSchema::new(
            name,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            vec![FormField::with_id(FieldId::new("f1"), FieldType::Text)],
        )
        .unwrap()
    }

    fn library() -> FormLibrary {
        FormLibrary::new(Arc::new(InMemoryKeyValueStore::new()))
    }

    #[tokio::test]
    async fn empty_library() {
        let library = library();
        assert!(library.list().await.unwrap().is_empty());
        assert_eq!(library.current().await.unwrap(), None);
    }

    #[tokio::test]
    async fn append_keeps_order_and_allows_duplicate_names() {
        let library = library();
        assert_eq!(library.append(schema("A")).await.unwrap(), 0);
        assert_eq!(library.append(schema("B")).await.unwrap(), 1);
        assert_eq!(library.append(schema("A")).await.unwrap(), 2);

        let names: Vec<_> = library
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|form| form.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "A"]);
    }

    /// Yields to the scheduler before every call, like a real database.
    struct YieldingStore(InMemoryKeyValueStore);

    #[async_trait::async_trait]
    impl KeyValueStore for YieldingStore {
        async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepoError> {
            tokio::task::yield_now().await;
            self.0.get(key).await
        }

        async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), RepoError> {
            tokio::task::yield_now().await;
            self.0.set(key, value).await
        }
    }

    #[tokio::test]
    async fn concurrent_appends_keep_every_form() {
        let library = FormLibrary::new(Arc::new(YieldingStore(InMemoryKeyValueStore::new())));

        let (first, second) = tokio::join!(library.append(schema("A")), library.append(schema("B")));
        let mut indices = vec![first.unwrap(), second.unwrap()];
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1]);

        let mut names: Vec<_> = library
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|form| form.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn select_writes_current_form() {
        let library = library();
        library.append(schema("A")).await.unwrap();
        library.append(schema("B")).await.unwrap();

        let selected = library.select(1).await.unwrap();
        assert_eq!(selected.name, "B");
        assert_eq!(library.current().await.unwrap(), Some(schema("B")));

        let err = library.select(5).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(library.current().await.unwrap(), Some(schema("B")));
    }

    #[tokio::test]
    async fn corrupt_saved_forms_is_serialization_error() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .withf(|key| key == SAVED_FORMS_KEY)
            .returning(|_| Ok(Some(json!({"not": "a list"}))));
        store.expect_set().never();

        let library = FormLibrary::new(Arc::new(store));
        assert!(matches!(
            library.list().await,
            Err(RepoError::Serialization(_))
        ));
        assert!(matches!(
            library.append(schema("A")).await,
            Err(RepoError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn append_writes_whole_list_under_saved_forms() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Some(json!([]))));
        store
            .expect_set()
            .withf(|key, value| {
                key == SAVED_FORMS_KEY
                    && value.as_array().map(Vec::len) == Some(1)
                    && value[0]["name"] == "Signup"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let library = FormLibrary::new(Arc::new(store));
        assert_eq!(library.append(schema("Signup")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Err(RepoError::database("kv_get", "locked")));

        let library = FormLibrary::new(Arc::new(store));
        assert!(matches!(
            library.current().await,
            Err(RepoError::Database { .. })
        ));
    }
}

//! Open builder drafts, keyed by session id.

use std::sync::Arc;

use dashmap::DashMap;
use formcraft_domain::BuilderSessionId;
use tokio::sync::Mutex;

use crate::infrastructure::ports::IdPort;
use crate::use_cases::FormBuilder;

/// Builder drafts side by side. Each draft sits behind its own async mutex, so
/// operations on one draft are serialized while others proceed.
#[derive(Default)]
pub struct BuilderSessionStore {
    sessions: DashMap<BuilderSessionId, Arc<Mutex<FormBuilder>>>,
}

impl BuilderSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new empty draft.
    pub fn create(&self, ids: Arc<dyn IdPort>) -> (BuilderSessionId, Arc<Mutex<FormBuilder>>) {
        let id = BuilderSessionId::new();
        let builder = Arc::new(Mutex::new(FormBuilder::new(ids)));
        self.sessions.insert(id, builder.clone());
        tracing::debug!(session_id = %id, "Opened builder session");
        (id, builder)
    }

    pub fn get(&self, id: BuilderSessionId) -> Option<Arc<Mutex<FormBuilder>>> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Close a draft. Returns false if it was not open.
    pub fn remove(&self, id: BuilderSessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SequentialIds;
    use formcraft_domain::FieldType;

    #[tokio::test]
    async fn drafts_are_independent() {
        let store = BuilderSessionStore::new();
        let ids: Arc<dyn IdPort> = Arc::new(SequentialIds::default());

        let (first, _) = store.create(ids.clone());
        let (second, _) = store.create(ids);
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);

        let draft = store.get(first).unwrap();
        draft.lock().await.add_field(FieldType::Text);

        assert_eq!(store.get(first).unwrap().lock().await.fields().len(), 1);
        assert!(store.get(second).unwrap().lock().await.fields().is_empty());

        assert!(store.remove(first));
        assert!(!store.remove(first));
        assert!(store.get(first).is_none());
    }
}

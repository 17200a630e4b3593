use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{DocumentStore, RawDocument, Snapshot};
use crate::errors::PortalError;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

struct Collection {
    docs: Vec<RawDocument>,
    changes: broadcast::Sender<Snapshot>,
}

impl Collection {
    fn new() -> Self {
        let (changes, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            docs: Vec::new(),
            changes,
        }
    }

    fn publish(&self) {
        // No receivers is fine; the snapshot is re-delivered on subscribe.
        let _ = self.changes.send(self.docs.clone());
    }
}

/// In-memory `DocumentStore` with the same observable behavior as the cloud
/// store: schemaless documents, shallow merges, push-based snapshots with no
/// ordering guarantee. Used by every test and the demo binary.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_collection<T>(&self, name: &str, f: impl FnOnce(&mut Collection) -> T) -> T {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(Collection::new);
        f(collection)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(
        &self,
        collection: &str,
        doc: serde_json::Value,
    ) -> Result<String, PortalError> {
        if !doc.is_object() {
            return Err(PortalError::validation("Document must be a JSON object"));
        }
        let id = Uuid::new_v4().to_string();
        self.with_collection(collection, |c| {
            c.docs.push(RawDocument {
                id: id.clone(),
                data: doc,
            });
            c.publish();
        });
        tracing::debug!(collection, id = %id, "Document created");
        Ok(id)
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        partial: serde_json::Value,
    ) -> Result<(), PortalError> {
        let partial = match partial {
            serde_json::Value::Object(map) => map,
            _ => return Err(PortalError::validation("Merge payload must be a JSON object")),
        };
        self.with_collection(collection, |c| {
            let doc = c
                .docs
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| PortalError::NotFound(format!("Document {id}")))?;
            let target = doc
                .data
                .as_object_mut()
                .ok_or_else(|| PortalError::validation("Stored document is not an object"))?;
            for (key, value) in partial {
                target.insert(key, value);
            }
            c.publish();
            Ok(())
        })?;
        tracing::debug!(collection, id, "Document merged");
        Ok(())
    }

    fn subscribe(&self, collection: &str) -> (Snapshot, broadcast::Receiver<Snapshot>) {
        self.with_collection(collection, |c| (c.docs.clone(), c.changes.subscribe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_assigns_ids_and_notifies_subscribers() {
        let store = MemoryStore::new();
        let (initial, mut rx) = store.subscribe("tasks");
        assert!(initial.is_empty());

        let id = store.create("tasks", json!({"name": "Suresh"})).await.unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].data["name"], "Suresh");
    }

    #[tokio::test]
    async fn merge_is_partial_not_a_replace() {
        let store = MemoryStore::new();
        let id = store
            .create("tasks", json!({"name": "Suresh", "status": "Pending Installation"}))
            .await
            .unwrap();

        store
            .merge("tasks", &id, json!({"status": "Installation Scheduled"}))
            .await
            .unwrap();

        let (snapshot, _) = store.subscribe("tasks");
        assert_eq!(snapshot[0].data["name"], "Suresh");
        assert_eq!(snapshot[0].data["status"], "Installation Scheduled");
    }

    #[tokio::test]
    async fn merge_on_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .merge("tasks", "nope", json!({"status": "Completed"}))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }
}

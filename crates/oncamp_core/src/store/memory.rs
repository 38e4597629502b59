//! In-process document store.
//!
//! Keeps collections in insertion order. Can be switched offline so callers
//! observe the same transport failure a remote store would produce.

use super::{
    generate_document_id, CollectionPath, Document, DocumentId, DocumentPath, DocumentSnapshot,
    DocumentStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

type Collection = Vec<(DocumentId, Document)>;

/// Insertion-ordered in-memory `DocumentStore`.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<BTreeMap<String, Collection>>,
    offline: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing (or regaining) connectivity to the store.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, BTreeMap<String, Collection>>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is offline".to_string(),
            ));
        }
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_documents(
        &self,
        collection: &CollectionPath,
    ) -> StoreResult<Vec<DocumentSnapshot>> {
        let state = self.state()?;
        Ok(state
            .get(&collection.as_string())
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| DocumentSnapshot {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_document(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        let state = self.state()?;
        Ok(state
            .get(&path.collection().as_string())
            .and_then(|docs| docs.iter().find(|(id, _)| id == path.id()))
            .map(|(_, data)| data.clone()))
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        data: Document,
    ) -> StoreResult<DocumentId> {
        let mut state = self.state()?;
        let id = generate_document_id();
        state
            .entry(collection.as_string())
            .or_default()
            .push((id.clone(), data));
        Ok(id)
    }

    async fn set_document(&self, path: &DocumentPath, data: Document) -> StoreResult<()> {
        let mut state = self.state()?;
        let docs = state.entry(path.collection().as_string()).or_default();
        match docs.iter_mut().find(|(id, _)| id == path.id()) {
            Some((_, existing)) => *existing = data,
            None => docs.push((path.id().to_string(), data)),
        }
        Ok(())
    }

    async fn merge_document(&self, path: &DocumentPath, fields: Document) -> StoreResult<()> {
        let mut state = self.state()?;
        let existing = state
            .get_mut(&path.collection().as_string())
            .and_then(|docs| docs.iter_mut().find(|(id, _)| id == path.id()))
            .map(|(_, data)| data)
            .ok_or_else(|| StoreError::MissingDocument(path.to_string()))?;
        existing.extend(fields);
        Ok(())
    }

    async fn delete_document(&self, path: &DocumentPath) -> StoreResult<()> {
        let mut state = self.state()?;
        let key = path.collection().as_string();
        if let Some(docs) = state.get_mut(&key) {
            docs.retain(|(id, _)| id != path.id());
            if docs.is_empty() {
                state.remove(&key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryDocumentStore;
    use crate::store::{CollectionPath, Document, DocumentStore, StoreError};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn listing_preserves_insertion_order() {
        let store = MemoryDocumentStore::new();
        let vendors = CollectionPath::root("Vendors").unwrap();
        for key in ["c", "a", "b"] {
            store
                .set_document(&vendors.doc(key).unwrap(), doc(json!({"name": key})))
                .await
                .unwrap();
        }

        let ids = store
            .list_documents(&vendors)
            .await
            .unwrap()
            .into_iter()
            .map(|snapshot| snapshot.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn merge_requires_existing_document() {
        let store = MemoryDocumentStore::new();
        let path = CollectionPath::root("Vendors").unwrap().doc("v1").unwrap();

        let err = store
            .merge_document(&path, doc(json!({"name": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingDocument(_)));
    }

    #[tokio::test]
    async fn deleting_last_document_drops_its_collection() {
        let store = MemoryDocumentStore::new();
        let products = CollectionPath::root("Vendors")
            .unwrap()
            .child("v1", "Products")
            .unwrap();
        let first = store.add_document(&products, doc(json!({"name": "a"}))).await.unwrap();
        let second = store.add_document(&products, doc(json!({"name": "b"}))).await.unwrap();

        store.delete_document(&products.doc(&first).unwrap()).await.unwrap();
        assert_eq!(store.collections.lock().unwrap().len(), 1);

        store.delete_document(&products.doc(&second).unwrap()).await.unwrap();
        assert!(store.collections.lock().unwrap().is_empty());
        assert!(store.list_documents(&products).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryDocumentStore::new();
        let vendors = CollectionPath::root("Vendors").unwrap();
        store.set_offline(true);

        assert!(matches!(
            store.list_documents(&vendors).await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_offline(false);
        assert!(store.list_documents(&vendors).await.unwrap().is_empty());
    }
}

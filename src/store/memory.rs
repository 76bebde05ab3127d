//! In-memory document store for local runs and tests.
//!
//! Nothing survives the process. Documents keep insertion order per
//! collection; upserts replace in place.

use super::{document_key, group_key, Collection, DocumentGroup, DocumentStore, UpsertOutcome};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct CollectionData {
    documents: Vec<Value>,
    /// Upsert key -> index into `documents`.
    keys: HashMap<String, usize>,
}

pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, CollectionData>>,
    closed: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Snapshot of every document in `collection`, in insertion order.
    pub fn documents(&self, collection: Collection) -> Vec<Value> {
        self.collections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&collection)
            .map_or(0, |c| c.documents.len())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upsert_one(
        &self,
        collection: Collection,
        key_field: &str,
        document: Value,
    ) -> Result<UpsertOutcome, StoreError> {
        self.ensure_open()?;
        let key = document_key(collection, key_field, &document)?;
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        let data = collections.entry(collection).or_default();

        match data.keys.get(&key) {
            Some(&index) => {
                data.documents[index] = document;
                debug!(%collection, %key, "Replaced document");
                Ok(UpsertOutcome::Replaced)
            }
            None => {
                data.keys.insert(key, data.documents.len());
                data.documents.push(document);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn insert_one(&self, collection: Collection, document: Value) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.collections
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(collection)
            .or_default()
            .documents
            .push(document);
        Ok(())
    }

    async fn group_by(
        &self,
        collection: Collection,
        field: &str,
    ) -> Result<Vec<DocumentGroup>, StoreError> {
        self.ensure_open()?;
        // `None` orders before every `Some`, matching NULLS FIRST.
        let mut groups: BTreeMap<Option<String>, Vec<Value>> = BTreeMap::new();
        for document in self.documents(collection) {
            groups
                .entry(group_key(field, &document))
                .or_default()
                .push(document);
        }
        Ok(groups
            .into_iter()
            .map(|(key, documents)| DocumentGroup { key, documents })
            .collect())
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("Memory store closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_replaces_by_key() {
        let store = MemoryStore::new();
        let first = json!({ "url": "https://a", "header": "old", "text": "x" });
        let second = json!({ "url": "https://a", "header": "new", "text": "y" });

        assert_eq!(
            store.upsert_one(Collection::News, "url", first).await.unwrap(),
            UpsertOutcome::Inserted
        );
        assert_eq!(
            store.upsert_one(Collection::News, "url", second.clone()).await.unwrap(),
            UpsertOutcome::Replaced
        );

        assert_eq!(store.documents(Collection::News), vec![second]);
    }

    #[tokio::test]
    async fn test_identical_upsert_does_not_duplicate() {
        let store = MemoryStore::new();
        let doc = json!({ "url": "https://a", "header": "h" });
        store.upsert_one(Collection::News, "url", doc.clone()).await.unwrap();
        store.upsert_one(Collection::News, "url", doc).await.unwrap();
        assert_eq!(store.count(Collection::News), 1);
    }

    #[tokio::test]
    async fn test_upsert_without_key_fails() {
        let store = MemoryStore::new();
        let result = store
            .upsert_one(Collection::News, "url", json!({ "header": "h" }))
            .await;
        assert!(matches!(result, Err(StoreError::MissingKey { .. })));
        assert_eq!(store.count(Collection::News), 0);
    }

    #[tokio::test]
    async fn test_insert_appends() {
        let store = MemoryStore::new();
        let doc = json!({ "word": "a", "count": 3 });
        store.insert_one(Collection::WordFrequency, doc.clone()).await.unwrap();
        store.insert_one(Collection::WordFrequency, doc).await.unwrap();
        assert_eq!(store.count(Collection::WordFrequency), 2);
        assert_eq!(store.count(Collection::News), 0);
    }

    #[tokio::test]
    async fn test_group_by_sorted_with_null_first() {
        let store = MemoryStore::new();
        for (url, date) in [
            ("https://c", json!("2024-02-01")),
            ("https://a", json!("2024-01-01")),
            ("https://n", Value::Null),
            ("https://b", json!("2024-01-01")),
        ] {
            store
                .upsert_one(Collection::News, "url", json!({ "url": url, "update_date": date }))
                .await
                .unwrap();
        }

        let groups = store.group_by(Collection::News, "update_date").await.unwrap();
        let keys: Vec<_> = groups.iter().map(|g| g.key.clone()).collect();
        assert_eq!(
            keys,
            vec![None, Some("2024-01-01".into()), Some("2024-02-01".into())]
        );
        let urls: Vec<_> = groups[1].documents.iter().map(|d| d["url"].clone()).collect();
        assert_eq!(urls, vec![json!("https://a"), json!("https://b")]);
    }

    #[tokio::test]
    async fn test_closed_store_rejects_writes() {
        let store = MemoryStore::new();
        store.close().await;
        store.close().await;
        assert!(store.is_closed());
        let result = store.insert_one(Collection::Stats, json!({})).await;
        assert!(matches!(result, Err(StoreError::Closed)));
    }
}

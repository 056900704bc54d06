//! Document store collaborator: per-collection JSON documents with change feeds.

use super::{lock, Callback, Listeners, Subscription};
use crate::error::{Result, WealthError};
use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A document together with its id inside the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Value,
}

/// A hosted document database, addressed by collection path and document id.
///
/// Collection paths look like `users/{uid}/months`. Implementations report
/// their own failures as [`WealthError::Store`].
pub trait DocumentStore: Send + Sync {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Creates or replaces a document.
    fn set(&self, collection: &str, id: &str, document: Value) -> Result<()>;

    /// Merges the top-level fields of `fields` into an existing document.
    fn update(&self, collection: &str, id: &str, fields: Value) -> Result<()>;

    fn delete(&self, collection: &str, id: &str) -> Result<()>;

    fn list(&self, collection: &str) -> Result<Vec<StoredDocument>>;

    /// Delivers the collection's documents now and after every write to it.
    fn subscribe(
        &self,
        collection: &str,
        callback: Callback<Vec<StoredDocument>>,
    ) -> Result<Subscription>;
}

/// In-process [`DocumentStore`].
///
/// Documents are kept in id order. Setting it offline makes every call fail,
/// the way a hosted store behaves when unreachable.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<BTreeMap<String, BTreeMap<String, Value>>>,
    listeners: Mutex<HashMap<String, Listeners<Vec<StoredDocument>>>>,
    offline: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self, collection: &str) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(WealthError::Store(format!(
                "document store unavailable for {}",
                collection
            )));
        }
        Ok(())
    }

    fn snapshot(&self, collection: &str) -> Vec<StoredDocument> {
        lock(&self.collections)
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| StoredDocument {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pushes the collection's new state to its subscribers and forgets
    /// collections nobody watches any more.
    ///
    /// The snapshot is taken after the write lock is released, so it may
    /// already include later writes. Concurrent writers to one collection can
    /// therefore deliver their snapshots out of order; callers that need the
    /// latest state should re-read with `list`.
    fn publish(&self, collection: &str) {
        let listeners = {
            let mut feeds = lock(&self.listeners);
            if feeds.get(collection).map_or(false, Listeners::is_empty) {
                feeds.remove(collection);
            }
            feeds.get(collection).cloned()
        };
        if let Some(listeners) = listeners {
            listeners.notify(&self.snapshot(collection));
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.ensure_online(collection)?;
        Ok(lock(&self.collections)
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    fn set(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        self.ensure_online(collection)?;
        lock(&self.collections)
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        debug!("Set document {}/{}", collection, id);
        self.publish(collection);
        Ok(())
    }

    fn update(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        self.ensure_online(collection)?;
        {
            let mut collections = lock(&self.collections);
            let existing = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| {
                    WealthError::Store(format!("no document to update at {}/{}", collection, id))
                })?;

            match (existing, fields) {
                (Value::Object(target), Value::Object(source)) => target.extend(source),
                (existing, replacement) => *existing = replacement,
            }
        }
        debug!("Updated document {}/{}", collection, id);
        self.publish(collection);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.ensure_online(collection)?;
        let removed = lock(&self.collections)
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            debug!("Deleted document {}/{}", collection, id);
            self.publish(collection);
        }
        Ok(())
    }

    fn list(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        self.ensure_online(collection)?;
        Ok(self.snapshot(collection))
    }

    fn subscribe(
        &self,
        collection: &str,
        callback: Callback<Vec<StoredDocument>>,
    ) -> Result<Subscription> {
        self.ensure_online(collection)?;
        let subscription = lock(&self.listeners)
            .entry(collection.to_string())
            .or_default()
            .register(callback.clone());
        callback(&self.snapshot(collection));
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    const MONTHS: &str = "users/u1/months";

    #[test]
    fn test_set_get_and_list() {
        let store = MemoryDocumentStore::new();
        store.set(MONTHS, "b", json!({"year": 2025})).unwrap();
        store.set(MONTHS, "a", json!({"year": 2024})).unwrap();

        assert_eq!(store.get(MONTHS, "a").unwrap(), Some(json!({"year": 2024})));
        assert_eq!(store.get(MONTHS, "missing").unwrap(), None);

        let ids: Vec<_> = store.list(MONTHS).unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(store.list("users/u2/months").unwrap().is_empty());
    }

    #[test]
    fn test_update_merges_fields() {
        let store = MemoryDocumentStore::new();
        store
            .set("users/u1/categories", "c1", json!({"name": "Cibo", "color": "#f59e0b"}))
            .unwrap();
        store
            .update("users/u1/categories", "c1", json!({"name": "Spesa"}))
            .unwrap();

        assert_eq!(
            store.get("users/u1/categories", "c1").unwrap(),
            Some(json!({"name": "Spesa", "color": "#f59e0b"}))
        );
    }

    #[test]
    fn test_update_missing_document_fails() {
        let store = MemoryDocumentStore::new();
        let result = store.update(MONTHS, "nope", json!({"year": 1}));
        assert!(matches!(result, Err(WealthError::Store(_))));
    }

    #[test]
    fn test_subscribe_delivers_snapshots() {
        let store = MemoryDocumentStore::new();
        store.set(MONTHS, "a", json!({})).unwrap();

        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = store
            .subscribe(
                MONTHS,
                Arc::new(move |docs: &Vec<StoredDocument>| lock(&sink).push(docs.len())),
            )
            .unwrap();

        store.set(MONTHS, "b", json!({})).unwrap();
        store.delete(MONTHS, "a").unwrap();
        store.set("users/u1/categories", "x", json!({})).unwrap();
        subscription.unsubscribe();
        store.set(MONTHS, "c", json!({})).unwrap();

        assert_eq!(*lock(&seen), vec![1, 2, 1]);
    }

    #[test]
    fn test_unwatched_collections_are_forgotten() {
        let store = MemoryDocumentStore::new();
        let first = store.subscribe(MONTHS, Arc::new(|_: &Vec<StoredDocument>| {})).unwrap();
        let second = store.subscribe(MONTHS, Arc::new(|_: &Vec<StoredDocument>| {})).unwrap();
        assert_eq!(lock(&store.listeners).len(), 1);

        first.unsubscribe();
        store.set(MONTHS, "a", json!({})).unwrap();
        assert!(lock(&store.listeners).contains_key(MONTHS));

        second.unsubscribe();
        store.set(MONTHS, "b", json!({})).unwrap();
        assert!(lock(&store.listeners).is_empty());

        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let again = store
            .subscribe(
                MONTHS,
                Arc::new(move |docs: &Vec<StoredDocument>| lock(&sink).push(docs.len())),
            )
            .unwrap();
        store.delete(MONTHS, "a").unwrap();
        again.unsubscribe();

        assert_eq!(*lock(&seen), vec![2, 1]);
    }

    #[test]
    fn test_offline_store_fails_every_call() {
        let store = MemoryDocumentStore::new();
        store.set_offline(true);

        assert!(matches!(store.get(MONTHS, "a"), Err(WealthError::Store(_))));
        assert!(store.set(MONTHS, "a", json!({})).is_err());
        assert!(store.list(MONTHS).is_err());

        store.set_offline(false);
        assert!(store.list(MONTHS).unwrap().is_empty());
    }
}

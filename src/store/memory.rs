//! In-process document store.
//!
//! # Responsibilities
//! - Hold one site's collections behind concurrent maps
//! - Enforce compound unique indexes on insert and update
//! - Load initial content from a JSON seed file at startup
//!
//! # Design Decisions
//! - Each collection is a `BTreeMap` so `find` returns documents in id order
//! - No lock is held across an await point; every operation is synchronous
//!   under the shard lock

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::store::filter::{lookup, lookup_mut, set_path};
use crate::store::{collections, Document, DocumentStore, Filter, StoreError, ID_FIELD};

/// Concurrent in-memory implementation of [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, BTreeMap<String, Document>>,
    unique_indexes: DashMap<String, Vec<Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store carrying the indexes a site database needs:
    /// `(path, wildcard)` is unique within `paths`.
    pub fn for_site() -> Self {
        let store = Self::new();
        store.unique_index(collections::PATHS, &["path", "wildcard"]);
        store
    }

    /// Load a site store from a seed file shaped `{ "<collection>": [doc, ...] }`.
    pub fn from_seed(path: &Path) -> Result<Self, StoreError> {
        let seed_file = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::SeedRead {
            path: seed_file.clone(),
            source,
        })?;
        let seed: Value = serde_json::from_str(&raw).map_err(|e| StoreError::SeedFormat {
            path: seed_file.clone(),
            reason: e.to_string(),
        })?;
        let Value::Object(seed) = seed else {
            return Err(StoreError::SeedFormat {
                path: seed_file,
                reason: "top level must be an object of collections".to_string(),
            });
        };

        let store = Self::for_site();
        for (collection, documents) in seed {
            let Value::Array(documents) = documents else {
                return Err(StoreError::SeedFormat {
                    path: seed_file,
                    reason: format!("collection `{collection}` must be an array"),
                });
            };
            for document in documents {
                let Value::Object(document) = document else {
                    return Err(StoreError::SeedFormat {
                        path: seed_file,
                        reason: format!("collection `{collection}` contains a non-object"),
                    });
                };
                store.insert_sync(&collection, document)?;
            }
        }

        tracing::info!(
            seed = %seed_file,
            collections = store.collections.len(),
            "Site store seeded"
        );
        Ok(store)
    }

    /// Register a compound unique index on `collection`.
    pub fn unique_index(&self, collection: &str, fields: &[&str]) {
        self.unique_indexes
            .entry(collection.to_string())
            .or_default()
            .push(fields.iter().map(|f| f.to_string()).collect());
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    fn check_unique(
        &self,
        collection: &str,
        docs: &BTreeMap<String, Document>,
        id: &str,
        candidate: &Document,
    ) -> Result<(), StoreError> {
        let Some(indexes) = self.unique_indexes.get(collection) else {
            return Ok(());
        };
        for fields in indexes.iter() {
            let key: Vec<Option<&Value>> = fields.iter().map(|f| lookup(candidate, f)).collect();
            let clash = docs.iter().any(|(other_id, other)| {
                other_id != id
                    && fields
                        .iter()
                        .zip(&key)
                        .all(|(f, value)| lookup(other, f) == *value)
            });
            if clash {
                return Err(StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    key: format!("{fields:?} = {key:?}"),
                });
            }
        }
        Ok(())
    }

    fn insert_sync(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        let id = match document.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(_) => {
                return Err(StoreError::MissingId {
                    collection: collection.to_string(),
                })
            }
            None => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut docs = self.collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                key: format!("_id = {id}"),
            });
        }
        self.check_unique(collection, &docs, &id, &document)?;
        docs.insert(id.clone(), document);
        Ok(id)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .values()
            .filter(|d| filter.matches(d))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        self.insert_sync(collection, document)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<bool, StoreError> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(current) = docs.get(id) else {
            return Ok(false);
        };
        let mut updated = current.clone();
        for (field, value) in fields {
            if field != ID_FIELD {
                set_path(&mut updated, &field, value);
            }
        }
        self.check_unique(collection, &docs, id, &updated)?;
        docs.insert(id.to_string(), updated);
        Ok(true)
    }

    async fn push(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<bool, StoreError> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(document) = docs.get_mut(id) else {
            return Ok(false);
        };
        if lookup(document, field).is_none() {
            set_path(document, field, Value::Array(Vec::new()));
        }
        match lookup_mut(document, field) {
            Some(Value::Array(items)) => {
                items.push(value);
                Ok(true)
            }
            _ => Err(StoreError::NotAnArray {
                collection: collection.to_string(),
                id: id.to_string(),
                field: field.to_string(),
            }),
        }
    }

    async fn pull_all(
        &self,
        collection: &str,
        filter: &Filter,
        field: &str,
        value: &Value,
    ) -> Result<u64, StoreError> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        let mut modified = 0;
        for document in docs.values_mut().filter(|d| filter.matches(d)) {
            if let Some(Value::Array(items)) = lookup_mut(document, field) {
                let before = items.len();
                items.retain(|item| item != value);
                if items.len() != before {
                    modified += 1;
                }
            }
        }
        Ok(modified)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .collections
            .get_mut(collection)
            .map(|mut docs| docs.remove(id).is_some())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_generates_id_and_finds_by_id() {
        let store = MemoryStore::new();
        let id = store.insert("elements", doc(json!({"title": "t"}))).await.unwrap();
        let found = store.find_by_id("elements", &id).await.unwrap().unwrap();
        assert_eq!(found.get(ID_FIELD), Some(&json!(id)));
        assert!(store.find_by_id("elements", "missing").await.unwrap().is_none());
        assert!(store.find_by_id("nothing", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_path_wildcard_pair_is_unique() {
        let store = MemoryStore::for_site();
        store
            .insert("paths", doc(json!({"_id": "p1", "path": "/x", "wildcard": false})))
            .await
            .unwrap();
        // Same path with the other wildcard flag is legal.
        store
            .insert("paths", doc(json!({"_id": "p2", "path": "/x", "wildcard": true})))
            .await
            .unwrap();
        let err = store
            .insert("paths", doc(json!({"_id": "p3", "path": "/x", "wildcard": true})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));

        let err = store
            .update_fields("paths", "p2", doc(json!({"wildcard": false})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_find_respects_limit_and_order() {
        let store = MemoryStore::new();
        for id in ["c", "a", "b"] {
            store
                .insert("elements", doc(json!({"_id": id, "controller": "wrapper"})))
                .await
                .unwrap();
        }
        let found = store
            .find("elements", &Filter::new().eq("controller", "wrapper"), 2)
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|d| d[ID_FIELD].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_push_and_pull_all() {
        let store = MemoryStore::new();
        store
            .insert("paths", doc(json!({"_id": "p1", "elements": ["e1", "e2"]})))
            .await
            .unwrap();
        store
            .insert("paths", doc(json!({"_id": "p2"})))
            .await
            .unwrap();

        assert!(store.push("paths", "p2", "elements", json!("e2")).await.unwrap());
        assert!(!store.push("paths", "nope", "elements", json!("e2")).await.unwrap());

        let pulled = store
            .pull_all("paths", &Filter::new().contains("elements", "e2"), "elements", &json!("e2"))
            .await
            .unwrap();
        assert_eq!(pulled, 2);
        let p1 = store.find_by_id("paths", "p1").await.unwrap().unwrap();
        assert_eq!(p1["elements"], json!(["e1"]));
    }

    #[tokio::test]
    async fn test_push_onto_scalar_fails() {
        let store = MemoryStore::new();
        store
            .insert("paths", doc(json!({"_id": "p1", "elements": "oops"})))
            .await
            .unwrap();
        let err = store.push("paths", "p1", "elements", json!("e")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAnArray { .. }));
    }

    #[tokio::test]
    async fn test_from_seed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"paths": [{{"_id": "home", "path": "/", "wildcard": false}}],
                "elements": [{{"_id": "e1", "controller": "content"}}]}}"#
        )
        .unwrap();
        let store = MemoryStore::from_seed(file.path()).unwrap();
        assert_eq!(store.count("paths"), 1);
        assert_eq!(store.count("elements"), 1);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, r#"{{"paths": {{}}}}"#).unwrap();
        assert!(matches!(
            MemoryStore::from_seed(bad.path()),
            Err(StoreError::SeedFormat { .. })
        ));
    }
}

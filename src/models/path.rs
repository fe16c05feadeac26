//! Path entities: registered logical routes within a site.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{document_id, ModelError};
use crate::store::{collections, Document, DocumentStore, Filter};

/// Documents sharing one `path` string. The unique index allows two.
const ROUTE_SCAN_LIMIT: usize = 4;

/// Publication state of a path. Any status other than `published` hides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStatus {
    #[default]
    Published,
    #[serde(other)]
    Unpublished,
}

/// A logical URL route. `(path, wildcard)` is unique within a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEntity {
    #[serde(rename = "_id")]
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub wildcard: bool,
    /// Ordered element ids rendered on this path.
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub status: PathStatus,
    #[serde(default)]
    pub title: String,
}

impl PathEntity {
    pub fn from_document(document: Document) -> Result<Self, ModelError> {
        let id = document_id(&document);
        serde_json::from_value(Value::Object(document)).map_err(|source| ModelError::Malformed {
            collection: collections::PATHS,
            id,
            source,
        })
    }

    pub fn to_document(&self) -> Document {
        match serde_json::to_value(self) {
            Ok(Value::Object(document)) => document,
            _ => Document::new(),
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PathStatus::Published
    }

    /// Exact lookup by the `(path, wildcard)` pair. A document without a
    /// `wildcard` field counts as `wildcard = false`.
    pub async fn find_by_route(
        store: &dyn DocumentStore,
        path: &str,
        wildcard: bool,
    ) -> Result<Option<Self>, ModelError> {
        let filter = Filter::new().eq("path", path);
        for document in store.find(collections::PATHS, &filter, ROUTE_SCAN_LIMIT).await? {
            let flag = document.get("wildcard").and_then(Value::as_bool).unwrap_or(false);
            if flag != wildcard {
                continue;
            }
            match Self::from_document(document) {
                Ok(entity) => return Ok(Some(entity)),
                Err(e) => {
                    tracing::warn!(path = %path, wildcard, error = %e, "Skipping unreadable path entry");
                }
            }
        }
        Ok(None)
    }

    pub async fn load(store: &dyn DocumentStore, id: &str) -> Result<Option<Self>, ModelError> {
        store
            .find_by_id(collections::PATHS, id)
            .await?
            .map(Self::from_document)
            .transpose()
    }

    /// Up to `limit` paths, in id order.
    pub async fn list(store: &dyn DocumentStore, limit: usize) -> Result<Vec<Self>, ModelError> {
        store
            .find(collections::PATHS, &Filter::new(), limit)
            .await?
            .into_iter()
            .map(Self::from_document)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_find_by_route_distinguishes_wildcard() {
        let store = MemoryStore::for_site();
        for (id, wildcard) in [("exact", false), ("wild", true)] {
            let path = PathEntity {
                id: id.to_string(),
                path: "/x".to_string(),
                wildcard,
                elements: vec![],
                template: String::new(),
                status: PathStatus::Published,
                title: String::new(),
            };
            store.insert(collections::PATHS, path.to_document()).await.unwrap();
        }

        let exact = PathEntity::find_by_route(&store, "/x", false).await.unwrap().unwrap();
        let wild = PathEntity::find_by_route(&store, "/x", true).await.unwrap().unwrap();
        assert_eq!(exact.id, "exact");
        assert_eq!(wild.id, "wild");
        assert!(PathEntity::find_by_route(&store, "/y", false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_wildcard_is_exact() {
        let store = MemoryStore::for_site();
        let doc = json!({"_id": "home", "path": "/"}).as_object().cloned().unwrap();
        store.insert(collections::PATHS, doc).await.unwrap();

        assert!(PathEntity::find_by_route(&store, "/", false).await.unwrap().is_some());
        assert!(PathEntity::find_by_route(&store, "/", true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_sibling_does_not_hide_route() {
        let store = MemoryStore::for_site();
        for doc in [
            json!({"_id": "a", "path": "/x", "wildcard": true, "elements": "e1"}),
            json!({"_id": "b", "path": "/x", "wildcard": false}),
        ] {
            store.insert(collections::PATHS, doc.as_object().cloned().unwrap()).await.unwrap();
        }

        let exact = PathEntity::find_by_route(&store, "/x", false).await.unwrap().unwrap();
        assert_eq!(exact.id, "b");
        assert!(PathEntity::find_by_route(&store, "/x", true).await.unwrap().is_none());
    }

    #[test]
    fn test_unknown_status_is_unpublished() {
        let doc = json!({"_id": "p", "path": "/", "status": "draft"}).as_object().cloned().unwrap();
        let path = PathEntity::from_document(doc).unwrap();
        assert_eq!(path.status, PathStatus::Unpublished);
        assert!(!path.is_published());
    }

    #[tokio::test]
    async fn test_list_is_capped() {
        let store = MemoryStore::for_site();
        for (id, route) in [("a", "/a"), ("b", "/b"), ("c", "/c")] {
            let doc = json!({"_id": id, "path": route}).as_object().cloned().unwrap();
            store.insert(collections::PATHS, doc).await.unwrap();
        }

        let paths = PathEntity::list(&store, 2).await.unwrap();
        let ids: Vec<&str> = paths.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let store = MemoryStore::new();
        let doc = json!({"_id": "bad", "path": 7}).as_object().cloned().unwrap();
        store.insert(collections::PATHS, doc).await.unwrap();
        let err = PathEntity::load(&store, "bad").await.unwrap_err();
        assert!(matches!(err, ModelError::Malformed { ref id, .. } if id == "bad"));
    }

    #[test]
    fn test_status_defaults_to_published() {
        let doc = json!({"_id": "p", "path": "/"}).as_object().cloned().unwrap();
        let path = PathEntity::from_document(doc).unwrap();
        assert!(path.is_published());
        assert!(!path.wildcard);
        assert!(path.elements.is_empty());
    }
}

//! Document-access layer.
//!
//! # Data Flow
//! ```text
//! models (Path, Element, ContentType)
//!     → StoreHandle (pool.rs, checked out once per request)
//!     → DocumentStore trait (lookup by id, filtered find, in-place updates)
//!     → MemoryStore (memory.rs), optionally seeded from a JSON file
//! ```
//!
//! # Design Decisions
//! - Only the query shapes the routing core needs: point lookup by id,
//!   conjunctive equality/membership filters with a result cap, field
//!   set, array push/pull
//! - Documents are plain JSON objects; typing happens in `models`
//! - Dotted field paths address nested values (`controller_values.elements`)

pub mod filter;
pub mod memory;
pub mod pool;

pub use filter::Filter;
pub use memory::MemoryStore;
pub use pool::{StoreHandle, StorePool};

use async_trait::async_trait;
use serde_json::{Map, Value};

/// A stored document: a JSON object keyed by `_id`.
pub type Document = Map<String, Value>;

/// Primary key field of every document.
pub const ID_FIELD: &str = "_id";

/// Collection names used by the site core.
pub mod collections {
    pub const PATHS: &str = "paths";
    pub const ELEMENTS: &str = "elements";
    pub const CONTENT_TYPES: &str = "content_types";
}

/// Errors raised by a document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key in `{collection}`: {key}")]
    DuplicateKey { collection: String, key: String },

    #[error("document in `{collection}` has no string `_id`")]
    MissingId { collection: String },

    #[error("field `{field}` of {collection}/{id} is not an array")]
    NotAnArray {
        collection: String,
        id: String,
        field: String,
    },

    #[error("failed to read seed file {path}: {source}")]
    SeedRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("seed file {path} is malformed: {reason}")]
    SeedFormat { path: String, reason: String },

    #[error("store connection pool is closed")]
    PoolClosed,
}

/// Query surface the routing core consumes.
///
/// Implementations must be safe for concurrent use; every call is a
/// potential suspension point and is dropped with the request future
/// when the client goes away.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Point lookup by `_id`.
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// All documents matching `filter`, in id order, at most `limit`.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError>;

    /// First document matching `filter`.
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError> {
        Ok(self.find(collection, filter, 1).await?.into_iter().next())
    }

    /// Insert a document, generating an `_id` when absent. Returns the id.
    async fn insert(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    /// Set each `(field, value)` pair on the document. Returns false if no such document.
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<bool, StoreError>;

    /// Append `value` to the array at `field`, creating it when missing.
    async fn push(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<bool, StoreError>;

    /// Remove every occurrence of `value` from the array at `field` in all
    /// matching documents. Returns the number of documents modified.
    async fn pull_all(
        &self,
        collection: &str,
        filter: &Filter,
        field: &str,
        value: &Value,
    ) -> Result<u64, StoreError>;

    /// Remove a document. Returns false if it did not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
}

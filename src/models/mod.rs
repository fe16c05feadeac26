//! Typed site entities over the document store.
//!
//! # Data Flow
//! ```text
//! Document (store)
//!     → from_document (validate shape at the load boundary)
//!     → PathEntity / Element / ContentType
//!     → resolver
//! ```
//!
//! # Design Decisions
//! - Element controller kind is a closed sum type; each variant owns its
//!   values shape
//! - A malformed values shape degrades to "no children", never an error
//! - Elements reference each other by id only (no in-memory links)

pub mod content_type;
pub mod element;
pub mod path;

pub use content_type::{ContentType, FieldSpec};
pub use element::{
    ContentValues, ControllerKind, Element, ElementKind, SlugValues, UnknownControllerKind,
    WrapperValues,
};
pub use path::{PathEntity, PathStatus};

use crate::store::StoreError;

/// Errors raised while loading entities.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{collection} document `{id}` is malformed: {source}")]
    Malformed {
        collection: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("element `{id}` declares unknown controller `{controller}`")]
    UnknownController { id: String, controller: String },
}

/// Best-effort id of a raw document, for error context.
pub(crate) fn document_id(document: &crate::store::Document) -> String {
    document
        .get(crate::store::ID_FIELD)
        .and_then(|v| v.as_str())
        .unwrap_or("<unknown>")
        .to_string()
}

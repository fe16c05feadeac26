//! Content resolution subsystem.
//!
//! # Data Flow
//! ```text
//! logical path ("/blog/my-post")
//!     → path.rs (hierarchical exact → wildcard → parent fallback)
//!     → PathMatch { path, residual: "my-post" }
//!
//! element id (+ expected kind, selector)
//!     → element.rs (whitelist check, dispatch on ElementKind)
//!     → ResolvedNode { payload: content | children | selected }
//! ```
//!
//! # Design Decisions
//! - Exact beats wildcard at every depth before climbing to the parent
//! - Container elements expand one level only; children come back as
//!   shallow descriptors, so cycles in the element graph cannot recurse
//! - Dangling child references are skipped and logged, never fatal

pub mod element;
pub mod path;

pub use element::{Assembler, ElementDescriptor, NodePayload, ResolvedNode};
pub use path::{resolve_logical_path, resolve_with_fallback, PathMatch};

use crate::models::{ControllerKind, ModelError};

/// Resolution failures. Handlers choose per variant whether to degrade or abort.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no path matches `{path}`")]
    PathNotFound { path: String },

    #[error("configured not-found path `{path}` is not registered")]
    NotFoundPathMissing { path: String },

    #[error("element `{id}` not found")]
    ElementNotFound { id: String },

    #[error("element `{id}` uses controller `{kind}`, which this site does not allow")]
    ForbiddenControllerKind { id: String, kind: ControllerKind },

    #[error("element `{id}` has no usable content type")]
    MissingContentType {
        id: String,
        content_type: Option<String>,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

//! Logical path resolution.
//!
//! # Algorithm
//! ```text
//! candidate = "/a/b/c", residual = []
//! (candidate, wildcard=false) published?      → match
//! loop:
//!     (candidate, wildcard=true)  published?  → match
//!     candidate is "/"                        → PathNotFound
//!     pop "c" onto the front of residual, candidate = "/a/b"
//! ```
//! Only the requested depth accepts an exact entry. Ancestors match
//! through wildcard entries alone, so an exact `/` never swallows
//! unknown paths. Store queries are bounded by `depth + 2`.

use std::collections::VecDeque;

use crate::models::PathEntity;
use crate::observability::metrics;
use crate::resolver::ResolveError;
use crate::store::DocumentStore;

/// A resolved path and the unmatched tail of the request.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatch {
    pub path: PathEntity,
    /// Segments consumed by climbing, joined by `/`. Empty on a direct hit.
    pub residual: String,
    /// True when the site's not-found path stands in for the request.
    pub substituted: bool,
}

/// Split a logical path into non-empty segments.
fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn to_candidate(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

/// Published entry for `(candidate, wildcard)`. Unpublished paths count as misses.
async fn find_published(
    store: &dyn DocumentStore,
    candidate: &str,
    wildcard: bool,
) -> Result<Option<PathEntity>, ResolveError> {
    match PathEntity::find_by_route(store, candidate, wildcard).await? {
        Some(found) if found.is_published() => Ok(Some(found)),
        Some(_) => {
            tracing::debug!(path = %candidate, wildcard, "Skipping unpublished path");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Exact then wildcard lookup of one candidate.
async fn find_route(
    store: &dyn DocumentStore,
    candidate: &str,
) -> Result<Option<PathEntity>, ResolveError> {
    match find_published(store, candidate, false).await? {
        Some(found) => Ok(Some(found)),
        None => find_published(store, candidate, true).await,
    }
}

/// Find the best registered path for `logical`, climbing towards the root.
pub async fn resolve_logical_path(
    store: &dyn DocumentStore,
    logical: &str,
) -> Result<PathMatch, ResolveError> {
    let mut remaining = segments(logical);
    let mut residual: VecDeque<&str> = VecDeque::new();
    let mut exact = find_published(store, &to_candidate(&remaining), false).await?;

    loop {
        let candidate = to_candidate(&remaining);
        let hit = match exact.take() {
            Some(path) => Some(path),
            None => find_published(store, &candidate, true).await?,
        };
        if let Some(path) = hit {
            let residual = residual.into_iter().collect::<Vec<_>>().join("/");
            tracing::debug!(
                logical = %logical,
                matched = %path.path,
                wildcard = path.wildcard,
                residual = %residual,
                "Path resolved"
            );
            return Ok(PathMatch {
                path,
                residual,
                substituted: false,
            });
        }
        match remaining.pop() {
            Some(segment) => residual.push_front(segment),
            None => break,
        }
    }

    Err(ResolveError::PathNotFound {
        path: logical.to_string(),
    })
}

/// Resolve `logical`, substituting the site's not-found path exactly once
/// when nothing matches. The not-found path is looked up at its own level
/// only and never falls back further.
pub async fn resolve_with_fallback(
    store: &dyn DocumentStore,
    not_found_path: &str,
    logical: &str,
) -> Result<PathMatch, ResolveError> {
    match resolve_logical_path(store, logical).await {
        Ok(found) => {
            metrics::record_path_resolution(if found.residual.is_empty() { "exact" } else { "ancestor" });
            Ok(found)
        }
        Err(ResolveError::PathNotFound { .. }) => {
            metrics::record_path_resolution("not_found");
            let fallback = to_candidate(&segments(not_found_path));
            match find_route(store, &fallback).await? {
                Some(path) => Ok(PathMatch {
                    path,
                    residual: String::new(),
                    substituted: true,
                }),
                None => Err(ResolveError::NotFoundPathMissing { path: fallback }),
            }
        }
        Err(e) => Err(e),
    }
}

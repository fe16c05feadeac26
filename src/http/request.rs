//! Per-request context.
//!
//! # Responsibilities
//! - Carry the resolved site, its checked-out store and the session
//! - Extract application signals (current path, selector) from the request
//! - Hold the response being built by the controller
//!
//! # Design Decisions
//! - Built once per request by the dispatch handler, after the host
//!   switch and session middleware have run
//! - The store handle is released when the context is dropped

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName};

use crate::http::response::ResponseContext;
use crate::session::Session;
use crate::store::{DocumentStore, StoreHandle};
use crate::tenancy::Tenant;

/// Logical path the client is currently displaying.
pub const X_CURRENT_PATH: HeaderName = HeaderName::from_static("x-current-path");
/// Selector consumed by slug elements.
pub const X_SELECTOR: HeaderName = HeaderName::from_static("x-selector");
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Site resolved by the host switch, attached to request extensions.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub tenant: Arc<Tenant>,
    pub store: Arc<StoreHandle>,
    pub host: String,
}

#[derive(Debug)]
pub struct RequestContext {
    pub tenant: Arc<Tenant>,
    pub store: Arc<StoreHandle>,
    pub host: String,
    pub request_id: String,
    /// From `x-current-path`, when the client sent one.
    pub current_path: Option<String>,
    /// From `x-selector`, else the `selector` query parameter.
    pub selector: Option<String>,
    pub session: Option<Session>,
    pub response: ResponseContext,
}

impl RequestContext {
    pub fn new(site: SiteContext, request_id: impl Into<String>) -> Self {
        Self {
            tenant: site.tenant,
            store: site.store,
            host: site.host,
            request_id: request_id.into(),
            current_path: None,
            selector: None,
            session: None,
            response: ResponseContext::new(),
        }
    }

    /// Read the application headers; `query_selector` is the fallback selector.
    pub fn with_signals(mut self, headers: &HeaderMap, query_selector: Option<String>) -> Self {
        self.current_path = header_str(headers, &X_CURRENT_PATH);
        self.selector = header_str(headers, &X_SELECTOR).or(query_selector.filter(|s| !s.is_empty()));
        self
    }

    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn store(&self) -> &dyn DocumentStore {
        &**self.store
    }
}

fn header_str(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Non-empty `/`-separated segments of a URL path.
pub fn path_tokens(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_path_tokens() {
        assert_eq!(path_tokens("/content/e1"), vec!["content", "e1"]);
        assert_eq!(path_tokens("//paths///blog/"), vec!["paths", "blog"]);
        assert!(path_tokens("/").is_empty());
    }

    #[test]
    fn test_header_str() {
        let mut headers = HeaderMap::new();
        headers.insert(X_SELECTOR, HeaderValue::from_static(" category "));
        headers.insert(X_CURRENT_PATH, HeaderValue::from_static(""));
        assert_eq!(header_str(&headers, &X_SELECTOR).as_deref(), Some("category"));
        assert_eq!(header_str(&headers, &X_CURRENT_PATH), None);
    }
}

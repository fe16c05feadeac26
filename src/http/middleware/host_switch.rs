//! Host switch middleware.
//! Binds each request to the site its Host header names.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::SiteError;
use crate::http::request::SiteContext;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::tenancy::request_host;

pub async fn host_switch_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let host = request_host(&req).unwrap_or_default();

    let Some(tenant) = state.registry.resolve(&host) else {
        metrics::record_tenant_miss();
        tracing::warn!(host = %host, path = %req.uri().path(), "No site for host");
        return SiteError::TenantNotFound { host }.into_response();
    };

    // Held until the response is produced.
    let store = match tenant.store.acquire().await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(tenant = %tenant.id, host = %host, error = %e, "Store checkout failed");
            return SiteError::Store(e).into_response();
        }
    };

    req.extensions_mut().insert(SiteContext {
        tenant,
        store: Arc::new(store),
        host,
    });
    next.run(req).await
}

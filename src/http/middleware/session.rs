//! Session middleware.
//!
//! Finds or creates the visitor session for the resolved site and
//! refreshes the session cookie on every response. Session failures are
//! logged and the request proceeds without one.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::http::request::SiteContext;
use crate::session::{Session, SESSION_COOKIE};

pub async fn session_middleware(mut req: Request<Body>, next: Next) -> Response {
    let Some(site) = req.extensions().get::<SiteContext>().cloned() else {
        return next.run(req).await;
    };

    let existing = cookie_value(req.headers(), SESSION_COOKIE);
    let session = match Session::find_or_create(Arc::clone(&site.tenant.sessions), existing.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(tenant = %site.tenant.id, host = %site.host, error = %e, "Session unavailable");
            return next.run(req).await;
        }
    };

    let cookie = session_cookie(session.id(), site.tenant.session_ttl);
    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// Value of cookie `name`, if present in any `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(id: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={id}; HttpOnly; Secure; Path=/; Max-Age={}",
        ttl.as_secs()
    )
}

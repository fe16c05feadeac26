//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (host switch, session, tracing, limits, request ID)
//! - Bind server to listener, plain or TLS
//! - Dispatch requests to the controller map
//! - Observability (metrics, correlation IDs)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Query, State},
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::controllers::ControllerRegistry;
use crate::error::SiteError;
use crate::http::middleware::{host_switch_middleware, session_middleware};
use crate::http::request::{path_tokens, RequestContext, SiteContext, X_REQUEST_ID};
use crate::observability::metrics;
use crate::session::Session;
use crate::tenancy::TenantRegistry;

/// In-flight TLS connections get this long to finish after shutdown.
const TLS_DRAIN: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TenantRegistry>,
    pub controllers: Arc<ControllerRegistry>,
}

/// HTTP server for the site switch.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

#[derive(Debug, Deserialize)]
struct SelectorQuery {
    selector: Option<String>,
}

impl HttpServer {
    pub fn new(
        config: ServerConfig,
        registry: Arc<TenantRegistry>,
        controllers: Arc<ControllerRegistry>,
    ) -> Self {
        let state = AppState {
            registry,
            controllers,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(dispatch_handler))
            .route("/{*path}", get(dispatch_handler))
            .layer(middleware::from_fn(session_middleware))
            .layer(middleware::from_fn_with_state(state.clone(), host_switch_middleware))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run with TLS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTPS server draining");
            drain.graceful_shutdown(Some(TLS_DRAIN));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Builds the request context and hands it to the controller map.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, _body) = request.into_parts();

    // Host switch always runs first.
    let Some(site) = parts.extensions.get::<SiteContext>().cloned() else {
        tracing::error!("Request reached dispatch without a site");
        return SiteError::TenantNotFound { host: String::new() }.into_response();
    };
    let session = parts.extensions.get::<Session>().cloned();

    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let selector = Query::<SelectorQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.selector);
    let tokens = path_tokens(parts.uri.path());

    let tenant_id = site.tenant.id.clone();
    let controller = tokens
        .first()
        .and_then(|t| state.controllers.canonical(&site.tenant, t))
        .unwrap_or("none")
        .to_string();

    tracing::debug!(
        request_id = %request_id,
        tenant = %tenant_id,
        host = %site.host,
        path = %parts.uri.path(),
        "Dispatching request"
    );

    let mut ctx = RequestContext::new(site, request_id)
        .with_signals(&parts.headers, selector)
        .with_session(session);

    let response = match state.controllers.dispatch(&mut ctx, &tokens).await {
        Ok(()) => std::mem::take(&mut ctx.response).into_response(),
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                tracing::error!(
                    request_id = %ctx.request_id,
                    tenant = %tenant_id,
                    host = %ctx.host,
                    params = ?tokens,
                    current_path = ?ctx.current_path,
                    error = %err,
                    "Request failed"
                );
            } else if err.is_recoverable() {
                tracing::info!(
                    request_id = %ctx.request_id,
                    tenant = %tenant_id,
                    params = ?tokens,
                    error = %err,
                    "Resolution degraded"
                );
            } else {
                tracing::warn!(
                    request_id = %ctx.request_id,
                    tenant = %tenant_id,
                    host = %ctx.host,
                    params = ?tokens,
                    error = %err,
                    "Request rejected"
                );
            }
            err.into_response()
        }
    };

    metrics::record_request(&tenant_id, &controller, response.status().as_u16(), start_time);
    response
}

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, tower layers, request id)
//!     → middleware/host_switch.rs (Host → tenant, store checkout)
//!     → middleware/session.rs (cookie → session)
//!     → request.rs (RequestContext: signals, tokens)
//!     → controllers (dispatch on first token)
//!     → response.rs (JSON payload, x-query-parameters)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, SiteContext, X_CURRENT_PATH, X_REQUEST_ID, X_SELECTOR};
pub use response::{Message, ResponseContext, Severity};
pub use server::{AppState, HttpServer};

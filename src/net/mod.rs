//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → tls.rs (optional TLS handshake via rustls)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional and handled transparently by axum-server
//! - Certificate problems are reported before the listener binds

pub mod tls;

pub use tls::{load_tls_config, TlsError};

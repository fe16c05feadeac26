//! Multi-tenancy subsystem.
//!
//! # Data Flow
//! ```text
//! Host header ("WWW.Blog.test:443")
//!     → host.rs (normalize: strip port, lowercase)
//!     → registry.rs (alias → Tenant)
//!     → Tenant { whitelist, not-found path, store pool, sessions }
//! ```
//!
//! # Design Decisions
//! - The registry is built once at startup and never mutated
//! - Every tenant owns its store pool; no request touches another's data

pub mod host;
pub mod registry;

pub use host::{normalize_host, request_host};
pub use registry::{RegistryError, Tenant, TenantRegistry};

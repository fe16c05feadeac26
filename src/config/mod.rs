//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! server.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig
//!
//! sites_directory/*.toml
//!     → loader.rs (one SiteConfig per file, id = file stem)
//!     → validation.rs (aliases unique across sites, kinds known)
//!     → lifecycle::startup (TenantRegistry)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; reload is not supported
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ServerConfig;
pub use schema::SiteConfig;

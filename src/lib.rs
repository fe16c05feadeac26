//! Multi-tenant site server library.

pub mod config;
pub mod controllers;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod models;
pub mod net;
pub mod observability;
pub mod resolver;
pub mod session;
pub mod store;
pub mod tenancy;

pub use config::schema::ServerConfig;
pub use controllers::ControllerRegistry;
pub use error::SiteError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use tenancy::TenantRegistry;

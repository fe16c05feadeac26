//! Configuration schema definitions.
//!
//! This module defines the server configuration and the per-site
//! configuration files. All types derive Serde traits for deserialization
//! from TOML.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the site server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Defaults for per-site stores.
    pub store: StoreConfig,

    /// Session housekeeping.
    pub sessions: SessionsConfig,

    /// Directory holding one `*.toml` file per site.
    pub sites_directory: String,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds. Expiry drops in-flight store calls.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }
}

/// Process-wide store defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Concurrent checkouts per site unless the site overrides it.
    pub max_connections: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { max_connections: 64 }
    }
}

/// Session housekeeping.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// How often expired sessions are swept from every site's store.
    pub sweep_interval_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self { sweep_interval_secs: 300 }
    }
}

/// One site (tenant), loaded from `<sites_directory>/<id>.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site identifier. Defaults to the config file stem.
    pub id: String,

    /// Domains routed to this site. Must not be empty.
    pub aliases: Vec<String>,

    /// Logical path served when nothing else matches.
    pub not_found_path: String,

    /// Element controller kinds this site may render.
    pub element_controllers: Vec<String>,

    /// Values exposed through the `domain` controller.
    pub public_values: HashMap<String, String>,

    /// Session lifetime since last update.
    pub session_expiration_hours: u64,

    /// Site-specific URL tokens mapped onto registered controllers.
    pub controller_aliases: HashMap<String, String>,

    pub store: SiteStoreConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            aliases: Vec::new(),
            not_found_path: "/404".to_string(),
            element_controllers: vec![
                "content".to_string(),
                "wrapper".to_string(),
                "slug".to_string(),
            ],
            public_values: HashMap::new(),
            session_expiration_hours: 24,
            controller_aliases: HashMap::new(),
            store: SiteStoreConfig::default(),
        }
    }
}

/// Per-site store settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteStoreConfig {
    /// JSON seed file, relative to the sites directory unless absolute.
    pub seed: Option<String>,

    /// Overrides `store.max_connections`.
    pub max_connections: Option<usize>,
}

//! Tenant registry: host alias to site.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SiteConfig;
use crate::models::{ControllerKind, UnknownControllerKind};
use crate::session::{MemorySessionStore, SessionStore};
use crate::store::{DocumentStore, StorePool};
use crate::tenancy::host::normalize_host;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("site `{0}` has no aliases")]
    EmptyAliases(String),

    #[error("alias `{alias}` is claimed by both `{first}` and `{second}`")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("site `{0}` is registered twice")]
    DuplicateTenant(String),

    #[error(transparent)]
    UnknownControllerKind(#[from] UnknownControllerKind),
}

/// One configured site and the resources bound to it.
#[derive(Debug)]
pub struct Tenant {
    pub id: String,
    pub aliases: Vec<String>,
    pub not_found_path: String,
    pub element_controllers: HashSet<ControllerKind>,
    pub public_values: HashMap<String, String>,
    /// Site-specific URL token → registered controller token.
    pub controller_aliases: HashMap<String, String>,
    pub session_ttl: Duration,
    pub store: StorePool,
    pub sessions: Arc<dyn SessionStore>,
}

impl Tenant {
    /// Bind a site configuration to its document store.
    pub fn from_config(
        config: &SiteConfig,
        store: Arc<dyn DocumentStore>,
        max_connections: usize,
    ) -> Result<Self, RegistryError> {
        let element_controllers = config
            .element_controllers
            .iter()
            .map(|k| k.parse::<ControllerKind>())
            .collect::<Result<HashSet<_>, _>>()?;
        let session_ttl = Duration::from_secs(config.session_expiration_hours.saturating_mul(3600));

        Ok(Self {
            id: config.id.clone(),
            aliases: config.aliases.iter().map(|a| normalize_host(a)).collect(),
            not_found_path: config.not_found_path.clone(),
            element_controllers,
            public_values: config.public_values.clone(),
            controller_aliases: config.controller_aliases.clone(),
            session_ttl,
            store: StorePool::new(store, max_connections),
            sessions: Arc::new(MemorySessionStore::new(session_ttl)),
        })
    }

    pub fn allows(&self, kind: ControllerKind) -> bool {
        self.element_controllers.contains(&kind)
    }
}

/// Immutable after startup; shared by every request.
#[derive(Debug, Default)]
pub struct TenantRegistry {
    tenants: HashMap<String, Arc<Tenant>>,
    aliases: HashMap<String, String>,
}

impl TenantRegistry {
    pub fn build(tenants: Vec<Tenant>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();

        for tenant in tenants {
            if tenant.aliases.is_empty() {
                return Err(RegistryError::EmptyAliases(tenant.id));
            }
            if registry.tenants.contains_key(&tenant.id) {
                return Err(RegistryError::DuplicateTenant(tenant.id));
            }
            for alias in &tenant.aliases {
                if let Some(first) = registry.aliases.get(alias) {
                    if *first == tenant.id {
                        continue;
                    }
                    return Err(RegistryError::DuplicateAlias {
                        alias: alias.clone(),
                        first: first.clone(),
                        second: tenant.id.clone(),
                    });
                }
                registry.aliases.insert(alias.clone(), tenant.id.clone());
            }
            tracing::info!(tenant = %tenant.id, aliases = ?tenant.aliases, "Site registered");
            registry.tenants.insert(tenant.id.clone(), Arc::new(tenant));
        }

        Ok(registry)
    }

    /// Site serving `host`, which may carry a port or mixed case.
    pub fn resolve(&self, host: &str) -> Option<Arc<Tenant>> {
        let id = self.aliases.get(&normalize_host(host))?;
        self.tenants.get(id).cloned()
    }

    pub fn tenant(&self, id: &str) -> Option<Arc<Tenant>> {
        self.tenants.get(id).cloned()
    }

    pub fn tenants(&self) -> impl Iterator<Item = &Arc<Tenant>> {
        self.tenants.values()
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

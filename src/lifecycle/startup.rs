//! Startup orchestration.
//!
//! # Responsibilities
//! - Open every site's document store (seeded or empty)
//! - Bind each site to its store pool and session store
//! - Build the immutable tenant registry
//!
//! # Design Decisions
//! - Fail fast: a bad seed file or alias conflict aborts startup
//! - Seed paths are relative to the sites directory unless absolute

use std::path::Path;
use std::sync::Arc;

use crate::config::{ServerConfig, SiteConfig};
use crate::store::{DocumentStore, MemoryStore, StoreError};
use crate::tenancy::{RegistryError, Tenant, TenantRegistry};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to open store for site `{site}`: {source}")]
    Store {
        site: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn open_store(sites_dir: &Path, site: &SiteConfig) -> Result<Arc<dyn DocumentStore>, StartupError> {
    let store = match &site.store.seed {
        Some(seed) => {
            let path = sites_dir.join(seed);
            MemoryStore::from_seed(&path).map_err(|source| StartupError::Store {
                site: site.id.clone(),
                source,
            })?
        }
        None => {
            tracing::warn!(tenant = %site.id, "No seed configured, site starts empty");
            MemoryStore::for_site()
        }
    };
    Ok(Arc::new(store))
}

/// Build the tenant registry for `sites`.
pub fn build_registry(
    config: &ServerConfig,
    sites_dir: &Path,
    sites: &[SiteConfig],
) -> Result<TenantRegistry, StartupError> {
    let mut tenants = Vec::with_capacity(sites.len());
    for site in sites {
        let store = open_store(sites_dir, site)?;
        let pool_size = site.store.max_connections.unwrap_or(config.store.max_connections);
        tenants.push(Tenant::from_config(site, store, pool_size)?);
    }

    let registry = TenantRegistry::build(tenants)?;
    tracing::info!(sites = registry.len(), "Tenant registry ready");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::collections;
    use std::fs;

    fn site(id: &str, alias: &str, seed: Option<&str>) -> SiteConfig {
        let mut site = SiteConfig {
            id: id.into(),
            aliases: vec![alias.into()],
            ..SiteConfig::default()
        };
        site.store.seed = seed.map(str::to_string);
        site
    }

    #[tokio::test]
    async fn test_build_registry_with_seed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("blog.json"),
            r#"{ "paths": [ { "_id": "p1", "path": "/", "template": "home" } ] }"#,
        )
        .unwrap();

        let mut blog = site("blog", "blog.test", Some("blog.json"));
        blog.store.max_connections = Some(2);
        let sites = [blog, site("shop", "shop.test", None)];

        let registry = build_registry(&ServerConfig::default(), dir.path(), &sites).unwrap();
        assert_eq!(registry.len(), 2);

        let blog = registry.resolve("blog.test").unwrap();
        assert_eq!(blog.store.max_connections(), 2);
        let handle = blog.store.acquire().await.unwrap();
        assert!(handle.find_by_id(collections::PATHS, "p1").await.unwrap().is_some());

        let shop = registry.resolve("shop.test").unwrap();
        assert_eq!(shop.store.max_connections(), 64);
    }

    #[test]
    fn test_missing_seed_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_registry(
            &ServerConfig::default(),
            dir.path(),
            &[site("blog", "blog.test", Some("absent.json"))],
        )
        .unwrap_err();
        assert!(matches!(err, StartupError::Store { ref site, .. } if site == "blog"));
    }
}

//! Controller map dispatch.
//!
//! # Data Flow
//! ```text
//! URL tokens ["content", "e1"]
//!     → tenant controller_aliases ("page" → "paths"), then the global map
//!     → Controller::handle(ctx, ["e1"])
//!     → ResponseContext filled in
//! ```
//!
//! # Design Decisions
//! - The map is built at startup and immutable at runtime
//! - An empty or unknown leading token is a hard 403, never a default

pub mod builtin;

pub use builtin::{DomainPublicValue, ElementValues, PathValues};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SiteError;
use crate::http::request::RequestContext;
use crate::models::ControllerKind;
use crate::tenancy::Tenant;

/// A request handler selected by the leading URL token.
#[async_trait]
pub trait Controller: Send + Sync {
    /// `params` are the URL tokens after the controller token.
    async fn handle(&self, ctx: &mut RequestContext, params: &[String]) -> Result<(), SiteError>;
}

#[derive(Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `paths`, one controller per element kind, and `domain`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(builtin::PATHS, Arc::new(PathValues));
        for kind in ControllerKind::ALL {
            registry.register(kind.as_str(), Arc::new(ElementValues::new(kind)));
        }
        registry.register(builtin::DOMAIN, Arc::new(DomainPublicValue));
        registry
    }

    /// Register `controller` under `token`, replacing any previous one.
    pub fn register(&mut self, token: impl Into<String>, controller: Arc<dyn Controller>) {
        self.controllers.insert(token.into(), controller);
    }

    /// Registered tokens, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The registered token `token` stands for on `tenant`, if any.
    pub fn canonical<'a>(&'a self, tenant: &'a Tenant, token: &'a str) -> Option<&'a str> {
        let target = tenant
            .controller_aliases
            .get(token)
            .map(String::as_str)
            .unwrap_or(token);
        self.controllers.get_key_value(target).map(|(name, _)| name.as_str())
    }

    pub fn lookup(&self, tenant: &Tenant, token: &str) -> Option<Arc<dyn Controller>> {
        let name = self.canonical(tenant, token)?;
        self.controllers.get(name).cloned()
    }

    /// Run the controller named by the first token with the remaining ones.
    pub async fn dispatch(&self, ctx: &mut RequestContext, tokens: &[String]) -> Result<(), SiteError> {
        let Some((token, params)) = tokens.split_first() else {
            return Err(SiteError::ControllerNotFound { token: String::new() });
        };
        let controller = self
            .lookup(&ctx.tenant, token)
            .ok_or_else(|| SiteError::ControllerNotFound { token: token.clone() })?;
        controller.handle(ctx, params).await
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::http::request::SiteContext;
    use crate::store::MemoryStore;

    struct Echo;

    #[async_trait]
    impl Controller for Echo {
        async fn handle(&self, ctx: &mut RequestContext, params: &[String]) -> Result<(), SiteError> {
            ctx.response.set_content(params)?;
            Ok(())
        }
    }

    async fn context(aliases: &[(&str, &str)]) -> RequestContext {
        let config = SiteConfig {
            id: "blog".into(),
            aliases: vec!["blog.test".into()],
            controller_aliases: aliases.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            ..SiteConfig::default()
        };
        let tenant = Arc::new(Tenant::from_config(&config, Arc::new(MemoryStore::for_site()), 2).unwrap());
        let store = Arc::new(tenant.store.acquire().await.unwrap());
        RequestContext::new(
            SiteContext {
                tenant,
                store,
                host: "blog.test".into(),
            },
            "req-1",
        )
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(
            ControllerRegistry::with_builtins().names(),
            vec!["content", "domain", "paths", "slug", "wrapper"]
        );
    }

    #[tokio::test]
    async fn test_dispatch_by_first_token() {
        let mut registry = ControllerRegistry::new();
        registry.register("echo", Arc::new(Echo));

        let mut ctx = context(&[]).await;
        registry
            .dispatch(&mut ctx, &["echo".into(), "a".into(), "b".into()])
            .await
            .unwrap();
        assert_eq!(ctx.response.content, serde_json::json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_unknown_or_empty_token() {
        let registry = ControllerRegistry::with_builtins();
        let mut ctx = context(&[]).await;

        let err = registry.dispatch(&mut ctx, &["nope".into()]).await.unwrap_err();
        assert!(matches!(err, SiteError::ControllerNotFound { ref token } if token == "nope"));

        let err = registry.dispatch(&mut ctx, &[]).await.unwrap_err();
        assert!(matches!(err, SiteError::ControllerNotFound { .. }));
    }

    #[tokio::test]
    async fn test_tenant_alias_wins() {
        let mut registry = ControllerRegistry::new();
        registry.register("echo", Arc::new(Echo));

        let mut ctx = context(&[("say", "echo")]).await;
        assert_eq!(registry.canonical(&ctx.tenant, "say"), Some("echo"));
        assert_eq!(registry.canonical(&ctx.tenant, "shout"), None);
        registry.dispatch(&mut ctx, &["say".into(), "hi".into()]).await.unwrap();
        assert_eq!(ctx.response.content, serde_json::json!(["hi"]));
    }
}

//! Shared fixtures for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use site_switch::config::{ServerConfig, SiteConfig};
use site_switch::lifecycle::{build_registry, Shutdown};
use site_switch::{ControllerRegistry, HttpServer, TenantRegistry};

/// Seed for the `blog` site.
pub const BLOG_SEED: &str = r#"{
  "paths": [
    { "_id": "p-home", "path": "/", "template": "home", "elements": ["w1"] },
    { "_id": "p-blog", "path": "/blog", "wildcard": true, "template": "blog-post", "elements": ["c1", "s1", "gone"] },
    { "_id": "p-draft", "path": "/draft", "template": "draft", "status": "unpublished" },
    { "_id": "p-404", "path": "/404", "template": "not-found" }
  ],
  "elements": [
    { "_id": "w1", "controller": "wrapper", "template": "list", "dynamic_id": "main",
      "controller_values": { "elements": ["c1", "s1", "missing"] } },
    { "_id": "c1", "controller": "content", "template": "article",
      "controller_values": { "content_type": "article",
        "content": { "title": "Hello", "body": "World", "internal": "hidden" } } },
    { "_id": "s1", "controller": "slug", "template": "picker",
      "controller_values": { "category": "c1" } }
  ],
  "content_types": [
    { "_id": "article", "type": "Article",
      "fields": [ { "name": "title", "type": "text" }, { "name": "body", "type": "textarea" } ] }
  ]
}"#;

/// Write the fixture sites into `dir`: `blog` (seeded) and `shop` (empty,
/// content only, `page` aliased to `paths`).
pub fn fixture_sites(dir: &Path) -> Vec<SiteConfig> {
    std::fs::write(dir.join("blog.json"), BLOG_SEED).unwrap();

    let mut blog = SiteConfig {
        id: "blog".into(),
        aliases: vec!["blog.test".into(), "www.blog.test".into()],
        ..SiteConfig::default()
    };
    blog.store.seed = Some("blog.json".into());
    blog.store.max_connections = Some(2);

    let mut shop = SiteConfig {
        id: "shop".into(),
        aliases: vec!["shop.test".into()],
        element_controllers: vec!["content".into()],
        ..SiteConfig::default()
    };
    shop.public_values.insert("phone".into(), "555-0100".into());
    shop.controller_aliases.insert("page".into(), "paths".into());

    vec![blog, shop]
}

/// Start a server on `addr` with the fixture sites. The returned guard
/// stops it when triggered.
pub async fn start_server(addr: SocketAddr) -> (Shutdown, Arc<TenantRegistry>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let sites = fixture_sites(dir.path());

    let mut config = ServerConfig::default();
    config.listener.bind_address = addr.to_string();
    let registry = Arc::new(build_registry(&config, dir.path(), &sites).unwrap());

    let shutdown = Shutdown::new();
    let server = HttpServer::new(
        config,
        Arc::clone(&registry),
        Arc::new(ControllerRegistry::with_builtins()),
    );
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(200)).await;

    (shutdown, registry, dir)
}

/// Client that never pools connections across tests.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

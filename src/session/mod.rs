//! Visitor sessions.
//!
//! # Data Flow
//! ```text
//! cookie `site_session`
//!     → http::middleware::session (find-or-create)
//!     → Session handle in request extensions
//!     → SessionStore (per site, TTL on last update)
//! ```
//!
//! # Design Decisions
//! - Session data is advisory: concurrent writers race, last write wins
//! - Unknown or expired ids are never adopted; a fresh id is issued

pub mod memory;

pub use memory::MemorySessionStore;

use std::sync::Arc;

use async_trait::async_trait;
use rand::RngCore;
use serde_json::{Map, Value};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "site_session";

const SESSION_ID_BYTES: usize = 30;

pub type SessionData = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Storage backing visitor sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Current data for a live session, `None` if unknown or expired.
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, SessionError>;

    /// Set one key, creating the session if needed, and refresh its expiry.
    async fn set(&self, session_id: &str, key: &str, value: Value) -> Result<(), SessionError>;

    /// Refresh expiry, creating an empty session if needed.
    async fn touch(&self, session_id: &str) -> Result<(), SessionError>;

    /// Drop every expired session. Returns how many were removed.
    async fn purge_expired(&self) -> Result<usize, SessionError>;
}

/// A random session id: 60 lowercase hex characters.
pub fn generate_session_id() -> String {
    let mut raw = [0u8; SESSION_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut raw);
    raw.iter().map(|b| format!("{b:02x}")).collect()
}

/// A visitor session bound to its site's store.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    store: Arc<dyn SessionStore>,
    created: bool,
}

impl Session {
    /// Adopt `existing` if the store knows it, otherwise start a new session.
    pub async fn find_or_create(
        store: Arc<dyn SessionStore>,
        existing: Option<&str>,
    ) -> Result<Self, SessionError> {
        if let Some(id) = existing {
            if store.get(id).await?.is_some() {
                store.touch(id).await?;
                return Ok(Self {
                    id: id.to_string(),
                    store,
                    created: false,
                });
            }
        }

        let id = generate_session_id();
        store.touch(&id).await?;
        tracing::debug!("New session issued");
        Ok(Self {
            id,
            store,
            created: true,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True when this request started the session.
    pub fn is_new(&self) -> bool {
        self.created
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self
            .store
            .get(&self.id)
            .await?
            .and_then(|mut data| data.remove(key)))
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<(), SessionError> {
        self.store.set(&self.id, key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_session_id_shape() {
        let id = generate_session_id();
        assert_eq!(id.len(), 60);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_session_id());
    }

    #[tokio::test]
    async fn test_find_or_create() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(Duration::from_secs(60)));

        let first = Session::find_or_create(Arc::clone(&store), None).await.unwrap();
        assert!(first.is_new());
        first.set("last_path", json!("/blog")).await.unwrap();

        let again = Session::find_or_create(Arc::clone(&store), Some(first.id())).await.unwrap();
        assert!(!again.is_new());
        assert_eq!(again.id(), first.id());
        assert_eq!(again.get("last_path").await.unwrap(), Some(json!("/blog")));

        // A forged id is not adopted.
        let forged = Session::find_or_create(Arc::clone(&store), Some("forged")).await.unwrap();
        assert!(forged.is_new());
        assert_ne!(forged.id(), "forged");
    }
}

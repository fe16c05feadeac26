//! In-memory session store with expiry on last update.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::session::{SessionData, SessionError, SessionStore};

#[derive(Debug)]
struct Entry {
    data: SessionData,
    updated: Instant,
}

/// Thread-safe session map. Expired entries read as absent and are
/// removed lazily or by [`SessionStore::purge_expired`].
#[derive(Debug)]
pub struct MemorySessionStore {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, SessionError> {
        let expired = match self.entries.get(session_id) {
            None => return Ok(None),
            Some(entry) if entry.updated.elapsed() < self.ttl => return Ok(Some(entry.data.clone())),
            Some(_) => true,
        };
        if expired {
            self.entries.remove(session_id);
        }
        Ok(None)
    }

    async fn set(&self, session_id: &str, key: &str, value: Value) -> Result<(), SessionError> {
        let mut entry = self.entries.entry(session_id.to_string()).or_insert_with(|| Entry {
            data: SessionData::new(),
            updated: Instant::now(),
        });
        if entry.updated.elapsed() >= self.ttl {
            entry.data.clear();
        }
        entry.data.insert(key.to_string(), value);
        entry.updated = Instant::now();
        Ok(())
    }

    async fn touch(&self, session_id: &str) -> Result<(), SessionError> {
        let mut entry = self.entries.entry(session_id.to_string()).or_insert_with(|| Entry {
            data: SessionData::new(),
            updated: Instant::now(),
        });
        if entry.updated.elapsed() >= self.ttl {
            entry.data.clear();
        }
        entry.updated = Instant::now();
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, SessionError> {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.updated.elapsed() < self.ttl);
        Ok(before.saturating_sub(self.entries.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        assert!(store.get("s1").await.unwrap().is_none());

        store.set("s1", "a", json!(1)).await.unwrap();
        store.set("s1", "a", json!(2)).await.unwrap();
        store.set("s1", "b", json!("x")).await.unwrap();

        let data = store.get("s1").await.unwrap().unwrap();
        assert_eq!(data.get("a"), Some(&json!(2)));
        assert_eq!(data.get("b"), Some(&json!("x")));
    }

    #[tokio::test]
    async fn test_expiry() {
        let store = MemorySessionStore::new(Duration::from_millis(20));
        store.set("s1", "a", json!(1)).await.unwrap();
        store.touch("s2").await.unwrap();
        assert_eq!(store.len(), 2);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.get("s1").await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_purge_bounds_abandoned_sessions() {
        let store = MemorySessionStore::new(Duration::from_millis(10));
        for i in 0..100 {
            store.touch(&format!("old-{i}")).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(30)).await;
        for i in 0..100 {
            store.touch(&format!("new-{i}")).await.unwrap();
        }

        assert_eq!(store.purge_expired().await.unwrap(), 100);
        assert_eq!(store.len(), 100);
    }
}

//! Bounded per-site store checkout.
//!
//! # Responsibilities
//! - Limit concurrent requests using a site's store
//! - Hand out a guard that releases its slot on drop, on every exit path

use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::store::{DocumentStore, StoreError};

/// A site's store plus a semaphore bounding concurrent checkouts.
#[derive(Debug, Clone)]
pub struct StorePool {
    store: Arc<dyn DocumentStore>,
    permits: Arc<Semaphore>,
    max_connections: usize,
}

impl StorePool {
    pub fn new(store: Arc<dyn DocumentStore>, max_connections: usize) -> Self {
        Self {
            store,
            permits: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        }
    }

    /// Check out a handle, waiting while the pool is exhausted.
    pub async fn acquire(&self) -> Result<StoreHandle, StoreError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| StoreError::PoolClosed)?;

        tracing::trace!(
            available = self.permits.available_permits(),
            "Store handle checked out"
        );

        Ok(StoreHandle {
            store: Arc::clone(&self.store),
            _permit: permit,
        })
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Stop handing out handles; pending and future `acquire` calls fail.
    pub fn close(&self) {
        self.permits.close();
    }
}

/// A checked-out store. Dereferences to the store; the slot is returned
/// to the pool when dropped.
#[derive(Debug)]
pub struct StoreHandle {
    store: Arc<dyn DocumentStore>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for StoreHandle {
    type Target = dyn DocumentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

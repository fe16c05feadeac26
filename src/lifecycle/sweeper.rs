//! Periodic session housekeeping.
//!
//! # Responsibilities
//! - Sweep expired sessions out of every site's session store
//! - Stop on the shared shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::tenancy::TenantRegistry;

pub struct SessionSweeper {
    registry: Arc<TenantRegistry>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(registry: Arc<TenantRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Session sweeper starting");

        let mut ticker = time::interval(self.interval);
        // The first tick fires immediately; nothing has expired yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Purge every site once. Returns the number of sessions removed.
    pub async fn sweep_once(&self) -> usize {
        let mut removed = 0;
        for tenant in self.registry.tenants() {
            match tenant.sessions.purge_expired().await {
                Ok(0) => {}
                Ok(count) => {
                    tracing::debug!(tenant = %tenant.id, removed = count, "Expired sessions purged");
                    removed += count;
                }
                Err(e) => {
                    tracing::warn!(tenant = %tenant.id, error = %e, "Session sweep failed");
                }
            }
        }
        removed
    }
}

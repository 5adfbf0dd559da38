//! In-memory caching using moka
//!
//! Holds studio rate tables, open booking wizard sessions and issued confirmations.
//! Rate tables change rarely; sessions expire when the guest walks away.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::booking::{BookingWizard, Confirmation};
use crate::pricing::StudioRates;

/// Application cache
#[derive(Clone)]
pub struct AppCache {
    /// Studio rate tables (studio_id -> StudioRates)
    pub studios: Cache<Uuid, Arc<StudioRates>>,
    /// Open wizard sessions (session_id -> BookingWizard)
    pub sessions: Cache<Uuid, Arc<BookingWizard>>,
    /// Issued confirmations (reference -> Confirmation)
    pub confirmations: Cache<String, Arc<Confirmation>>,
}

impl AppCache {
    /// Create a new cache instance; sessions idle out after `session_ttl_minutes`
    pub fn new(session_ttl_minutes: u64) -> Self {
        Self {
            // Studio rates: 1000 entries, 15 min TTL
            studios: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(Duration::from_secs(15 * 60))
                .build(),

            // Wizard sessions: idle timeout only, refreshed on every step
            sessions: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(Duration::from_secs(session_ttl_minutes * 60))
                .build(),

            // Confirmations: kept for a day so the guest can reload the page
            confirmations: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(24 * 60 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            studios_size: self.studios.entry_count(),
            sessions_size: self.sessions.entry_count(),
            confirmations_size: self.confirmations.entry_count(),
        }
    }

    /// Drop a studio's cached rates so the next quote reloads them
    pub async fn invalidate_studio(&self, studio_id: Uuid) {
        self.studios.invalidate(&studio_id).await;
        info!("Cache invalidated for studio: {}", studio_id);
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub studios_size: u64,
    pub sessions_size: u64,
    pub confirmations_size: u64,
}

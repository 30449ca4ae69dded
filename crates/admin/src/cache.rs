//! Store data cache and cross-tab sync versioning.
//!
//! Every page needs the store record (name, currency, order settings), so it
//! is cached per store for a short TTL instead of fetched on every request.
//! Each cached store carries a version number. The version moves forward
//! whenever the dashboard writes something for that store, or a re-fetch
//! returns data different from what was cached. Open pages poll
//! `/api/sync` and compare the version against the one they were rendered
//! with.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use storedesk_core::StoreId;

use crate::api::{Store, StoreApiClient, StoreApiError};

/// Stores idle longer than this are forgotten entirely (version included).
const VERSION_IDLE: Duration = Duration::from_secs(6 * 60 * 60);
const MAX_STORES: u64 = 10_000;

/// A store snapshot and the sync version it was observed at.
#[derive(Debug, Clone)]
pub struct CachedStore {
    pub store: Arc<Store>,
    pub version: u64,
}

/// Per-store cache of backend store data.
#[derive(Clone)]
pub struct StoreCache {
    inner: Arc<StoreCacheInner>,
}

struct StoreCacheInner {
    /// Fresh snapshots; entries expire after the TTL, forcing a re-fetch.
    fresh: Cache<StoreId, CachedStore>,
    /// Last snapshot ever seen per store, kept past the TTL so a re-fetch
    /// can tell whether the data changed.
    last_seen: Cache<StoreId, CachedStore>,
}

impl StoreCache {
    /// Create a cache whose snapshots expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let fresh = Cache::builder()
            .max_capacity(MAX_STORES)
            .time_to_live(ttl)
            .build();
        let last_seen = Cache::builder()
            .max_capacity(MAX_STORES)
            .time_to_idle(VERSION_IDLE)
            .build();

        Self {
            inner: Arc::new(StoreCacheInner { fresh, last_seen }),
        }
    }

    /// Return the cached store, fetching it from the backend when the cached
    /// copy is missing or expired.
    ///
    /// # Errors
    ///
    /// Returns the backend error if a fetch was needed and failed.
    pub async fn get_or_fetch(
        &self,
        api: &StoreApiClient,
        token: &str,
        store_id: &StoreId,
    ) -> Result<CachedStore, StoreApiError> {
        if let Some(cached) = self.inner.fresh.get(store_id).await {
            return Ok(cached);
        }

        let store = api.get_store(token, store_id).await?;
        Ok(self.record(store_id, store).await)
    }

    /// Store a freshly fetched snapshot and work out its version.
    async fn record(&self, store_id: &StoreId, store: Store) -> CachedStore {
        let previous = self.inner.last_seen.get(store_id).await;
        let version = match previous {
            Some(prev) if *prev.store == store => prev.version,
            Some(prev) => {
                tracing::debug!(store_id = %store_id, "Store data changed upstream");
                prev.version + 1
            }
            None => 1,
        };

        let cached = CachedStore {
            store: Arc::new(store),
            version,
        };
        self.inner
            .fresh
            .insert(store_id.clone(), cached.clone())
            .await;
        self.inner
            .last_seen
            .insert(store_id.clone(), cached.clone())
            .await;
        cached
    }

    /// Drop the cached snapshot after a write and move the version forward
    /// so other open pages notice.
    pub async fn invalidate(&self, store_id: &StoreId) {
        self.inner.fresh.invalidate(store_id).await;
        if let Some(mut prev) = self.inner.last_seen.get(store_id).await {
            prev.version += 1;
            self.inner.last_seen.insert(store_id.clone(), prev).await;
        } else {
            tracing::debug!(store_id = %store_id, "Invalidated a store that was never cached");
        }
    }

    /// Current sync version, refreshing from the backend when the cached
    /// copy has expired. Used by `/api/sync`.
    ///
    /// # Errors
    ///
    /// Returns the backend error if a re-fetch was needed and failed.
    pub async fn sync_version(
        &self,
        api: &StoreApiClient,
        token: &str,
        store_id: &StoreId,
    ) -> Result<u64, StoreApiError> {
        Ok(self.get_or_fetch(api, token, store_id).await?.version)
    }

    /// Version last handed out for a store, or 0 if it was never cached.
    pub async fn version(&self, store_id: &StoreId) -> u64 {
        self.inner
            .last_seen
            .get(store_id)
            .await
            .map_or(0, |cached| cached.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(name: &str) -> Store {
        serde_json::from_value(serde_json::json!({ "id": "s1", "name": name }))
            .unwrap_or_else(|e| panic!("{e}"))
    }

    #[tokio::test]
    async fn test_record_keeps_version_when_unchanged() {
        let cache = StoreCache::new(Duration::from_secs(60));
        let id = StoreId::new("s1");

        let first = cache.record(&id, store("Corner Shop")).await;
        assert_eq!(first.version, 1);

        let same = cache.record(&id, store("Corner Shop")).await;
        assert_eq!(same.version, 1);

        let changed = cache.record(&id, store("Corner Shop & Cafe")).await;
        assert_eq!(changed.version, 2);
        assert_eq!(cache.version(&id).await, 2);
    }

    #[tokio::test]
    async fn test_invalidate_bumps_version_and_drops_snapshot() {
        let cache = StoreCache::new(Duration::from_secs(60));
        let id = StoreId::new("s1");

        cache.record(&id, store("Corner Shop")).await;
        cache.invalidate(&id).await;

        assert_eq!(cache.version(&id).await, 2);
        assert!(cache.inner.fresh.get(&id).await.is_none());

        // Re-fetching identical data after an invalidation keeps the bumped version.
        let refetched = cache.record(&id, store("Corner Shop")).await;
        assert_eq!(refetched.version, 2);
    }

    #[tokio::test]
    async fn test_unknown_store_has_version_zero() {
        let cache = StoreCache::new(Duration::from_secs(60));
        assert_eq!(cache.version(&StoreId::new("nope")).await, 0);
        cache.invalidate(&StoreId::new("nope")).await;
        assert_eq!(cache.version(&StoreId::new("nope")).await, 0);
    }
}

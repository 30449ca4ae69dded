//! Application state shared across handlers.

use std::sync::Arc;

use crate::{
    api::{StoreApiClient, StoreApiError},
    cache::StoreCache,
    config::AdminConfig,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: StoreApiClient,
    store_cache: StoreCache,
}

impl AppState {
    /// Build the state: backend client plus an empty store cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, StoreApiError> {
        let api = StoreApiClient::new(&config.store_api)?;
        let store_cache = StoreCache::new(config.store_cache_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                store_cache,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &StoreApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn store_cache(&self) -> &StoreCache {
        &self.inner.store_cache
    }
}

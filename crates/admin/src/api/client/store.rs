//! Store settings endpoints.

use tracing::instrument;

use storedesk_core::StoreId;

use super::{StoreApiClient, StoreApiError, store_path};
use crate::api::types::{OrderSettings, Store, StoreUpdate};

impl StoreApiClient {
    /// Fetch the store record, including its order settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the store does not exist.
    #[instrument(skip(self, token))]
    pub async fn get_store(&self, token: &str, store_id: &StoreId) -> Result<Store, StoreApiError> {
        self.get(token, &store_path(store_id, "")).await
    }

    /// Update the store profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, token, update))]
    pub async fn update_store(
        &self,
        token: &str,
        store_id: &StoreId,
        update: &StoreUpdate,
    ) -> Result<Store, StoreApiError> {
        self.put_json(token, &store_path(store_id, ""), update).await
    }

    /// Replace the store's order settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the settings.
    #[instrument(skip(self, token, settings))]
    pub async fn update_order_settings(
        &self,
        token: &str,
        store_id: &StoreId,
        settings: &OrderSettings,
    ) -> Result<(), StoreApiError> {
        self.put_empty(token, &store_path(store_id, "order-settings"), Some(settings))
            .await
    }
}

//! Product endpoints.

use tracing::instrument;

use storedesk_core::{ProductId, StoreId};

use super::{StoreApiClient, StoreApiError, store_path};
use crate::api::types::{Product, ProductInput};

fn product_path(store_id: &StoreId, id: &ProductId) -> String {
    store_path(
        store_id,
        &format!("products/{}", urlencoding::encode(id.as_str())),
    )
}

impl StoreApiClient {
    /// Every product in the store, across all pages.
    ///
    /// # Errors
    ///
    /// Returns an error if any page fails to load.
    #[instrument(skip(self, token))]
    pub async fn list_all_products(
        &self,
        token: &str,
        store_id: &StoreId,
    ) -> Result<Vec<Product>, StoreApiError> {
        self.fetch_all(token, &store_path(store_id, "products")).await
    }

    /// # Errors
    ///
    /// Returns `StoreApiError::NotFound` if the product does not exist.
    #[instrument(skip(self, token))]
    pub async fn get_product(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &ProductId,
    ) -> Result<Product, StoreApiError> {
        self.get(token, &product_path(store_id, id)).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the product.
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        token: &str,
        store_id: &StoreId,
        input: &ProductInput,
    ) -> Result<Product, StoreApiError> {
        self.post_json(token, &store_path(store_id, "products"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, token, input))]
    pub async fn update_product(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, StoreApiError> {
        self.put_json(token, &product_path(store_id, id), input).await
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    #[instrument(skip(self, token))]
    pub async fn delete_product(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &ProductId,
    ) -> Result<(), StoreApiError> {
        self.delete(token, &product_path(store_id, id)).await
    }
}

//! Promotion endpoints.

use tracing::instrument;

use storedesk_core::{PromotionId, StoreId};

use super::{StoreApiClient, StoreApiError, store_path};
use crate::api::types::{Promotion, PromotionInput};

fn promotion_path(store_id: &StoreId, id: &PromotionId) -> String {
    store_path(
        store_id,
        &format!("promotions/{}", urlencoding::encode(id.as_str())),
    )
}

impl StoreApiClient {
    /// # Errors
    ///
    /// Returns an error if any page fails to load.
    #[instrument(skip(self, token))]
    pub async fn list_all_promotions(
        &self,
        token: &str,
        store_id: &StoreId,
    ) -> Result<Vec<Promotion>, StoreApiError> {
        self.fetch_all(token, &store_path(store_id, "promotions"))
            .await
    }

    /// # Errors
    ///
    /// Returns `StoreApiError::NotFound` if the promotion does not exist.
    #[instrument(skip(self, token))]
    pub async fn get_promotion(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &PromotionId,
    ) -> Result<Promotion, StoreApiError> {
        self.get(token, &promotion_path(store_id, id)).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the promotion (e.g. a
    /// duplicate code).
    #[instrument(skip(self, token, input), fields(code = %input.code))]
    pub async fn create_promotion(
        &self,
        token: &str,
        store_id: &StoreId,
        input: &PromotionInput,
    ) -> Result<Promotion, StoreApiError> {
        self.post_json(token, &store_path(store_id, "promotions"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, token, input))]
    pub async fn update_promotion(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &PromotionId,
        input: &PromotionInput,
    ) -> Result<Promotion, StoreApiError> {
        self.put_json(token, &promotion_path(store_id, id), input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    #[instrument(skip(self, token))]
    pub async fn delete_promotion(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &PromotionId,
    ) -> Result<(), StoreApiError> {
        self.delete(token, &promotion_path(store_id, id)).await
    }
}

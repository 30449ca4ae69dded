//! Order endpoints.

use tracing::instrument;

use storedesk_core::{OrderId, OrderStatus, StoreId};

use super::{StoreApiClient, StoreApiError, store_path};
use crate::api::types::{Order, OrderStatusUpdate};

fn order_path(store_id: &StoreId, id: &OrderId) -> String {
    store_path(store_id, &format!("orders/{}", urlencoding::encode(id.as_str())))
}

impl StoreApiClient {
    /// Every order in the store, across all pages.
    ///
    /// # Errors
    ///
    /// Returns an error if any page fails to load.
    #[instrument(skip(self, token))]
    pub async fn list_all_orders(
        &self,
        token: &str,
        store_id: &StoreId,
    ) -> Result<Vec<Order>, StoreApiError> {
        self.fetch_all(token, &store_path(store_id, "orders")).await
    }

    /// # Errors
    ///
    /// Returns `StoreApiError::NotFound` if the order does not exist.
    #[instrument(skip(self, token))]
    pub async fn get_order(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &OrderId,
    ) -> Result<Order, StoreApiError> {
        self.get(token, &order_path(store_id, id)).await
    }

    /// Move an order to a new status.
    ///
    /// Transition rules are checked by the caller before this is sent; the
    /// backend enforces them again.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the transition.
    #[instrument(skip(self, token))]
    pub async fn update_order_status(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, StoreApiError> {
        let path = format!("{}/status", order_path(store_id, id));
        self.put_json(token, &path, &OrderStatusUpdate { status }).await
    }
}

//! Notification endpoints.

use tracing::instrument;

use storedesk_core::{NotificationId, StoreId};

use super::{StoreApiClient, StoreApiError, store_path};
use crate::api::types::Notification;

impl StoreApiClient {
    /// # Errors
    ///
    /// Returns an error if any page fails to load.
    #[instrument(skip(self, token))]
    pub async fn list_all_notifications(
        &self,
        token: &str,
        store_id: &StoreId,
    ) -> Result<Vec<Notification>, StoreApiError> {
        self.fetch_all(token, &store_path(store_id, "notifications"))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the update fails.
    #[instrument(skip(self, token))]
    pub async fn mark_notification_read(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &NotificationId,
    ) -> Result<(), StoreApiError> {
        let path = store_path(
            store_id,
            &format!("notifications/{}/read", urlencoding::encode(id.as_str())),
        );
        self.put_empty::<()>(token, &path, None).await
    }

    /// # Errors
    ///
    /// Returns an error if the update fails.
    #[instrument(skip(self, token))]
    pub async fn mark_all_notifications_read(
        &self,
        token: &str,
        store_id: &StoreId,
    ) -> Result<(), StoreApiError> {
        self.put_empty::<()>(token, &store_path(store_id, "notifications/read-all"), None)
            .await
    }
}

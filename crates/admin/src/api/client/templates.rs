//! Template endpoints (read-only).

use tracing::instrument;

use storedesk_core::{StoreId, TemplateId};

use super::{StoreApiClient, StoreApiError, store_path};
use crate::api::types::Template;

impl StoreApiClient {
    /// # Errors
    ///
    /// Returns an error if any page fails to load.
    #[instrument(skip(self, token))]
    pub async fn list_all_templates(
        &self,
        token: &str,
        store_id: &StoreId,
    ) -> Result<Vec<Template>, StoreApiError> {
        self.fetch_all(token, &store_path(store_id, "templates"))
            .await
    }

    /// # Errors
    ///
    /// Returns `StoreApiError::NotFound` if the template does not exist.
    #[instrument(skip(self, token))]
    pub async fn get_template(
        &self,
        token: &str,
        store_id: &StoreId,
        id: &TemplateId,
    ) -> Result<Template, StoreApiError> {
        let path = store_path(
            store_id,
            &format!("templates/{}", urlencoding::encode(id.as_str())),
        );
        self.get(token, &path).await
    }
}

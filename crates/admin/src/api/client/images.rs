//! Image upload endpoint.

use reqwest::multipart::{Form, Part};
use tracing::instrument;

use storedesk_core::StoreId;

use super::{StoreApiClient, StoreApiError, store_path};
use crate::api::types::ImageRef;

impl StoreApiClient {
    /// Upload one already-processed image.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails or the backend rejects the file.
    #[instrument(skip(self, token, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        token: &str,
        store_id: &StoreId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageRef, StoreApiError> {
        let path = store_path(store_id, "images");
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let request = self
            .request(reqwest::Method::POST, Some(token), &path)?
            .multipart(form);
        self.send_json(request, &path).await
    }
}

//! Image upload endpoint.
//!
//! Forms upload images here first, then submit the returned ids in a
//! hidden field.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::post,
};
use tracing::instrument;

use crate::{
    api::ImageRef,
    error::AppError,
    middleware::RequireManager,
    services::images::{UploadedFile, upload_images},
    state::AppState,
};

/// Multipart field carrying files.
const FILE_FIELD: &str = "file";

/// Build the images router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/images", post(upload))
}

/// Resize and upload every `file` field of a multipart body.
///
/// # Errors
///
/// Returns 400 for unreadable bodies or files, 502 when the backend
/// rejects an upload.
#[instrument(skip(user, state, multipart))]
pub async fn upload(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<ImageRef>>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if bytes.is_empty() {
            continue;
        }
        files.push(UploadedFile {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    let count = files.len();
    let uploaded = upload_images(
        state.api(),
        &user.token,
        &user.store_id,
        files,
        state.config().images,
    )
    .await?;

    tracing::info!(count, "Uploaded images");
    Ok(Json(uploaded))
}

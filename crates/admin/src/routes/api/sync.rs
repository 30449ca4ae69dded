//! Cross-tab sync endpoint.
//!
//! Open pages poll this and compare the version against the one they were
//! rendered with; a difference means another tab or the backend changed
//! store data.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::{error::AppError, middleware::RequireAuth, state::AppState};

/// Build the sync router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/sync", get(sync_version))
}

/// Sync version response.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub version: u64,
}

/// Current data version for the session's store.
///
/// # Errors
///
/// Returns an error if the store needed re-fetching and the backend failed.
pub async fn sync_version(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<SyncResponse>, AppError> {
    let version = state
        .store_cache()
        .sync_version(state.api(), &user.token, &user.store_id)
        .await?;
    Ok(Json(SyncResponse { version }))
}

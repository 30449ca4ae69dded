//! Notification bell endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::{
    error::AppError, middleware::RequireAuth, routes::notifications::unread_count,
    state::AppState,
};

/// Build the notifications API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/notifications/unread", get(unread))
}

/// Unread count response.
#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub count: usize,
}

/// Number of unread notifications, polled by the bell.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached.
pub async fn unread(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<UnreadResponse>, AppError> {
    let notifications = state
        .api()
        .list_all_notifications(&user.token, &user.store_id)
        .await?;
    Ok(Json(UnreadResponse {
        count: unread_count(&notifications),
    }))
}

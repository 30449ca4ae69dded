//! Notification preference API handlers.

use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::{
    error::AppError,
    middleware::RequireAuth,
    models::{NotificationPrefs, session_keys},
    state::AppState,
};

/// Build the preferences router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/notifications/preferences", post(save_notification_prefs))
}

/// Request for saving notification preferences. Missing toggles are off.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotificationPrefsRequest {
    pub sound: bool,
    pub desktop: bool,
}

/// Response for preference updates.
#[derive(Debug, Serialize)]
pub struct PrefsResponse {
    pub success: bool,
}

/// Save notification toggles in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn save_notification_prefs(
    RequireAuth(_user): RequireAuth,
    session: Session,
    Json(body): Json<NotificationPrefsRequest>,
) -> Result<Json<PrefsResponse>, AppError> {
    let prefs = NotificationPrefs {
        sound: body.sound,
        desktop: body.desktop,
    };
    session
        .insert(session_keys::NOTIFICATION_PREFS, prefs)
        .await?;
    tracing::debug!(sound = prefs.sound, desktop = prefs.desktop, "Saved notification preferences");
    Ok(Json(PrefsResponse { success: true }))
}

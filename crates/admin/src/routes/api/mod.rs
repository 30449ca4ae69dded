//! JSON API route handlers for admin.
//!
//! Small endpoints the page scripts call: sync polling, image uploads,
//! promo code generation and the notification bell.

pub mod images;
pub mod notifications;
pub mod preferences;
pub mod promotions;
pub mod sync;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(sync::router())
        .merge(images::router())
        .merge(promotions::router())
        .merge(notifications::router())
        .merge(preferences::router())
}

//! Promo code generation endpoint.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use storedesk_core::PromoCode;

use crate::{middleware::RequireManager, state::AppState};

/// Build the promotions API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/promotions/code", get(generate_code))
}

/// Generated code response.
#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub code: String,
}

/// A fresh random promo code for the "Generate" button. Uniqueness is
/// checked by the backend when the promotion is saved.
pub async fn generate_code(RequireManager(_user): RequireManager) -> Json<CodeResponse> {
    Json(CodeResponse {
        code: PromoCode::generate().into_inner(),
    })
}

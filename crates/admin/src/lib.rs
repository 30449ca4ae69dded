//! Storedesk Admin library.
//!
//! The server-rendered store back office: product catalogue, orders,
//! promotions, employees and store settings. Every entity lives in the
//! store REST backend; this crate renders it, validates edits before
//! sending them, and keeps a short-lived cache of store data.
//!
//! The router is built by [`app`] so the binary and the integration tests
//! serve exactly the same stack.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use config::ConfigError;
use middleware::{clear_expired_session, create_session_layer};
use state::AppState;

/// Headroom on top of the image bytes for multipart framing and form fields.
const BODY_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Most files accepted in one upload request.
const MAX_FILES_PER_UPLOAD: usize = 10;

/// Build the full application router with sessions, tracing and static
/// files.
///
/// Sentry layers are added by the binary, around this router.
///
/// # Errors
///
/// Returns an error if the session signing key cannot be derived.
pub fn app(state: AppState) -> Result<Router, ConfigError> {
    let config = state.config();
    let session_layer = create_session_layer(config)?;
    let body_limit = config
        .images
        .max_upload_bytes
        .saturating_mul(MAX_FILES_PER_UPLOAD)
        .saturating_add(BODY_OVERHEAD_BYTES);
    let static_dir = ServeDir::new(&config.static_dir);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .layer(axum::middleware::from_fn(clear_expired_session))
        .layer(session_layer)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

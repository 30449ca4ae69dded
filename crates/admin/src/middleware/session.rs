//! Session middleware configuration for admin.
//!
//! Sessions live in process memory and the cookie is signed with
//! `ADMIN_SESSION_SECRET` (SameSite=Strict, 24hr inactivity expiry).

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use tower_sessions::{
    Expiry, MemoryStore, Session, SessionManagerLayer, cookie::Key, service::SignedCookie,
};

use crate::config::{AdminConfig, ConfigError};
use crate::error::SessionExpired;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "storedesk_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the signed-cookie session layer with an in-memory store.
///
/// # Errors
///
/// Returns an error if the session secret is too short to derive a
/// signing key from.
pub fn create_session_layer(
    config: &AdminConfig,
) -> Result<SessionManagerLayer<MemoryStore, SignedCookie>, ConfigError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes()).map_err(|e| {
        ConfigError::InsecureSecret("ADMIN_SESSION_SECRET".to_string(), e.to_string())
    })?;

    Ok(SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}

/// Drop the session when a handler reports that the backend rejected the
/// user's token.
///
/// HTML requests keep the redirect to the login page; `/api/` requests get a
/// plain 401 so page scripts can react.
pub async fn clear_expired_session(session: Session, request: Request, next: Next) -> Response {
    let is_api = request.uri().path().starts_with("/api/");
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_none() {
        return response;
    }

    tracing::info!("Backend rejected session token, signing out");
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush expired session");
    }

    if is_api {
        StatusCode::UNAUTHORIZED.into_response()
    } else {
        response
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use url::Url;

    use super::*;
    use crate::config::{ImageLimits, StoreApiConfig};

    fn config(secret: &str) -> AdminConfig {
        AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "https://admin.shop.test".to_string(),
            session_secret: SecretString::from(secret.to_string()),
            store_api: StoreApiConfig {
                base_url: Url::parse("http://localhost:8080/api/").unwrap(),
                timeout: Duration::from_secs(15),
            },
            store_cache_ttl: Duration::from_secs(60),
            sync_poll_interval_ms: 2000,
            images: ImageLimits::default(),
            page_size: 20,
            static_dir: "crates/admin/static".to_string(),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
            tls: None,
        }
    }

    #[test]
    fn test_session_layer_requires_64_byte_key() {
        assert!(create_session_layer(&config(&"k".repeat(64))).is_ok());
        assert!(matches!(
            create_session_layer(&config("short")),
            Err(ConfigError::InsecureSecret(..))
        ));
    }
}

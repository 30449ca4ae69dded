//! Store REST backend client.
//!
//! Every entity the dashboard shows is owned by the backend; this module is
//! the only place that talks to it. Calls carry the bearer token of the
//! logged-in user, taken from their session.
//!
//! # Example
//!
//! ```rust,ignore
//! use storedesk_admin::api::StoreApiClient;
//!
//! let client = StoreApiClient::new(&config.store_api)?;
//! let products = client.list_all_products(&user.token, &user.store_id).await?;
//! ```

mod client;
pub mod types;

pub use client::{FETCH_ALL_PAGE_SIZE, StoreApiClient};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the store backend.
#[derive(Debug, Error)]
pub enum StoreApiError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the backend's `{message}` body, or the raw body.
        message: String,
    },

    /// Token missing, expired or revoked.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl StoreApiError {
    /// Message suitable for a flash message or form banner.
    ///
    /// Client errors (4xx) carry the backend's own explanation, which is
    /// usually a validation message worth showing. Everything else is
    /// replaced with a generic line.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, message } if (400..500).contains(status) => message.clone(),
            Self::NotFound(_) => "The requested item no longer exists.".to_string(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            _ => "The store service is unavailable. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_api_error_display() {
        let err = StoreApiError::NotFound("store/1/products/9".to_string());
        assert_eq!(err.to_string(), "Not found: store/1/products/9");

        let err = StoreApiError::Status {
            status: 409,
            message: "Code already in use".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 409: Code already in use");
    }

    #[test]
    fn test_user_message_hides_server_errors() {
        let client_err = StoreApiError::Status {
            status: 422,
            message: "Price must be positive".to_string(),
        };
        assert_eq!(client_err.user_message(), "Price must be positive");

        let server_err = StoreApiError::Status {
            status: 500,
            message: "NullPointerException at ...".to_string(),
        };
        assert!(!server_err.user_message().contains("NullPointer"));
    }
}

//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::StoreApiError;
use crate::services::images::ImageError;

/// Marker placed on responses whose backend call came back 401.
///
/// The session middleware sees it, drops the login and, for `/api/` requests,
/// turns the redirect into a bare 401.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store backend call failed.
    #[error("Store API error: {0}")]
    Api(#[from] StoreApiError),

    /// Image upload pipeline failed.
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this is our fault (or the backend's) rather than the user's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Api(e) => matches!(
                e,
                StoreApiError::Http(_)
                    | StoreApiError::Parse(_)
                    | StoreApiError::Url(_)
                    | StoreApiError::Status { status: 500.., .. }
            ),
            Self::Image(e) => !e.is_client_error(),
            Self::Session(_) | Self::Internal(_) => true,
            Self::NotFound(_)
            | Self::Unauthorized(_)
            | Self::Forbidden(_)
            | Self::BadRequest(_) => false,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Api(StoreApiError::Unauthorized) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Api(StoreApiError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Api(StoreApiError::Status { status, .. }) if *status >= 400 && *status < 500 => {
                StatusCode::BAD_REQUEST
            }
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::Image(ImageError::Api(_)) => StatusCode::BAD_GATEWAY,
            Self::Image(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Image(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show the user. Internal details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) | Self::Image(ImageError::Api(e)) => e.user_message(),
            Self::Image(e) if e.is_client_error() => e.to_string(),
            Self::Image(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        } else {
            tracing::debug!(error = %self, "Admin request rejected");
        }

        if matches!(self, Self::Api(StoreApiError::Unauthorized)) {
            let mut response = Redirect::to("/auth/login").into_response();
            response.extensions_mut().insert(SessionExpired);
            return response;
        }

        (self.status(), self.user_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order-123".to_string());
        assert_eq!(err.to_string(), "Not found: order-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backend_errors_map_to_gateway_or_client_status() {
        let server = AppError::Api(StoreApiError::Status {
            status: 503,
            message: "down".to_string(),
        });
        assert!(server.is_server_error());
        assert_eq!(get_status(server), StatusCode::BAD_GATEWAY);

        let client = AppError::Api(StoreApiError::Status {
            status: 409,
            message: "Code already in use".to_string(),
        });
        assert!(!client.is_server_error());
        assert_eq!(client.user_message(), "Code already in use");
        assert_eq!(get_status(client), StatusCode::BAD_REQUEST);

        assert_eq!(
            get_status(AppError::Api(StoreApiError::NotFound("x".to_string()))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_backend_unauthorized_redirects_and_marks_response() {
        let response = AppError::Api(StoreApiError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }

    #[test]
    fn test_image_errors() {
        let bad_file = AppError::Image(ImageError::Unsupported("notes.txt".to_string()));
        assert_eq!(bad_file.status(), StatusCode::BAD_REQUEST);
        assert!(bad_file.user_message().contains("notes.txt"));

        let internal = AppError::Image(ImageError::Task("panicked".to_string()));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.user_message(), "Internal server error");
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("db password leaked".to_string());
        assert_eq!(err.user_message(), "Internal server error");
    }
}

//! Login and logout handlers.
//!
//! Credentials are checked by the backend; on success its bearer token is
//! kept in the server-side session and never sent to the browser.

use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    api::{LoginRequest, StoreApiError},
    error::AppError,
    filters,
    middleware::{clear_current_user, set_current_user, set_flash},
    models::{CurrentUser, Flash, session_keys},
    state::AppState,
};

use super::render;

/// Login form submission.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// Login page. Signed-in users go straight to the dashboard.
#[instrument(skip(session))]
pub async fn login_page(session: Session) -> Response {
    let signed_in = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .is_some();
    if signed_in {
        return Redirect::to("/").into_response();
    }

    render(&LoginTemplate {
        email: String::new(),
        error: None,
    })
}

/// Sign in against the backend.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_string();
    let password = SecretString::from(form.password);

    if email.is_empty() || password.expose_secret().is_empty() {
        return Ok(login_error(
            email,
            "Enter your email and password",
            StatusCode::UNPROCESSABLE_ENTITY,
        ));
    }

    let request = LoginRequest {
        email: email.clone(),
        password: password.expose_secret().to_string(),
    };

    match state.api().login(&request).await {
        Ok(response) => {
            let user = CurrentUser::from(response);
            set_current_user(&session, &user).await?;
            tracing::info!(store_id = %user.store_id, role = %user.role, "User signed in");
            set_flash(&session, Flash::success(format!("Welcome back, {}", user.name))).await;
            Ok(Redirect::to("/").into_response())
        }
        Err(StoreApiError::Unauthorized | StoreApiError::NotFound(_)) => {
            tracing::info!("Sign-in rejected");
            Ok(login_error(email, "Invalid email or password", StatusCode::UNAUTHORIZED))
        }
        Err(e @ StoreApiError::Status { status: 400..=499, .. }) => {
            Ok(login_error(email, &e.user_message(), StatusCode::UNAUTHORIZED))
        }
        Err(e) => {
            tracing::error!(error = %e, "Sign-in request failed");
            Ok(login_error(email, &e.user_message(), StatusCode::BAD_GATEWAY))
        }
    }
}

fn login_error(email: String, message: &str, status: StatusCode) -> Response {
    let page = render(&LoginTemplate {
        email,
        error: Some(message.to_string()),
    });
    (status, page).into_response()
}

/// Sign out and return to the login page.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    Ok(Redirect::to("/auth/login"))
}

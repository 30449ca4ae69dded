//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Dashboard
//! GET  /                              - Counts, low stock, recent orders
//!
//! # Auth
//! GET  /auth/login                    - Login page
//! POST /auth/login                    - Sign in against the backend
//! POST /auth/logout                   - Sign out
//!
//! # Products
//! GET  /products                      - List (q, status, stock, category, sort, dir, page)
//! GET  /products/new                  - Create form
//! POST /products                      - Create
//! GET  /products/{id}                 - Detail (tab=overview|images|inventory)
//! GET  /products/{id}/edit            - Edit form
//! POST /products/{id}                 - Update
//! POST /products/{id}/delete          - Delete
//!
//! # Orders
//! GET  /orders                        - List (q, status, sort, dir, page)
//! GET  /orders/{id}                   - Detail (tab=items|customer)
//! POST /orders/{id}/status            - Move to the next status
//!
//! # Promotions
//! GET  /promotions                    - List (q, state, type, sort, dir, page)
//! GET  /promotions/new                - Create form
//! POST /promotions                    - Create
//! GET  /promotions/{id}/edit          - Edit form
//! POST /promotions/{id}               - Update
//! POST /promotions/{id}/delete        - Delete
//!
//! # Employees
//! GET  /employees                     - List (q, role, sort, dir, page)
//! POST /employees                     - Invite
//! POST /employees/{id}/delete         - Remove
//!
//! # Settings
//! GET  /settings                      - Tabs: store|orders|password|notifications|employees
//! POST /settings/store                - Store profile
//! POST /settings/orders               - Order settings
//! POST /settings/password             - Change password
//!
//! # Notifications
//! GET  /notifications                 - Popover partial
//! POST /notifications/{id}/read       - Mark one read
//! POST /notifications/read-all        - Mark all read
//!
//! # Templates
//! GET  /templates                     - Gallery (q, category)
//! GET  /templates/{id}                - Detail (tab=overview|preview)
//!
//! # JSON API (used by page scripts)
//! GET  /api/sync                      - Store data version for cross-tab sync
//! POST /api/images                    - Resize and upload images
//! GET  /api/promotions/code           - Fresh promo code
//! GET  /api/notifications/unread      - Unread count
//! POST /api/notifications/preferences - Sound/desktop toggles
//! ```

use askama::Template;
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tower_sessions::Session;

use storedesk_core::{CurrencyCode, Price};

use crate::{
    api::StoreApiError,
    error::AppError,
    forms::FormErrors,
    middleware::take_flash,
    models::{CurrentUser, Flash, NotificationPrefs, session_keys},
    state::AppState,
};

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod employees;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod settings;
pub mod templates;

/// Build the application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Dashboard
        .route("/", get(dashboard::dashboard))
        // Auth
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Products
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new))
        .route("/products/{id}", get(products::show).post(products::update))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
        // Orders
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        // Promotions
        .route("/promotions", get(promotions::index).post(promotions::create))
        .route("/promotions/new", get(promotions::new))
        .route("/promotions/{id}", post(promotions::update))
        .route("/promotions/{id}/edit", get(promotions::edit))
        .route("/promotions/{id}/delete", post(promotions::delete))
        // Employees
        .route("/employees", get(employees::index).post(employees::invite))
        .route("/employees/{id}/delete", post(employees::remove))
        // Settings
        .route("/settings", get(settings::index))
        .route("/settings/store", post(settings::update_store))
        .route("/settings/orders", post(settings::update_orders))
        .route("/settings/password", post(settings::change_password))
        // Notifications
        .route("/notifications", get(notifications::popover))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        // Templates
        .route("/templates", get(templates::index))
        .route("/templates/{id}", get(templates::show))
        // JSON API
        .merge(api::router())
}

/// Data every full page needs for the shell: who is signed in, which store,
/// the sync version the page was rendered at, and any pending flash.
#[derive(Debug, Clone)]
pub struct Layout {
    pub user_name: String,
    pub user_email: String,
    pub role_label: String,
    pub can_manage: bool,
    pub current_path: String,
    pub store_name: String,
    pub currency: CurrencyCode,
    pub sync_version: u64,
    pub sync_poll_ms: u64,
    pub flash: Option<Flash>,
    pub prefs: NotificationPrefs,
}

impl Layout {
    /// Load the shell data for a page.
    ///
    /// A backend outage degrades to a generic store name; only an expired
    /// token is an error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api(Unauthorized)` when the backend rejects the
    /// session's token.
    pub async fn load(
        state: &AppState,
        session: &Session,
        user: &CurrentUser,
        current_path: &str,
    ) -> Result<Self, AppError> {
        let (store_name, currency, sync_version) = match state
            .store_cache()
            .get_or_fetch(state.api(), &user.token, &user.store_id)
            .await
        {
            Ok(cached) => (
                cached.store.name.clone(),
                cached.store.currency,
                cached.version,
            ),
            Err(StoreApiError::Unauthorized) => {
                return Err(AppError::Api(StoreApiError::Unauthorized));
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    store_id = %user.store_id,
                    "Failed to load store for layout"
                );
                (
                    "Store".to_string(),
                    CurrencyCode::default(),
                    state.store_cache().version(&user.store_id).await,
                )
            }
        };

        let prefs = session
            .get::<NotificationPrefs>(session_keys::NOTIFICATION_PREFS)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();

        Ok(Self {
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            role_label: user.role.label().to_string(),
            can_manage: user.can_manage(),
            current_path: current_path.to_string(),
            store_name,
            currency,
            sync_version,
            sync_poll_ms: state.config().sync_poll_interval_ms,
            flash: take_flash(session).await,
            prefs,
        })
    }

    /// Format an amount in the store's currency.
    #[must_use]
    pub fn money(&self, amount: Decimal) -> String {
        Price::new(amount, self.currency).display()
    }

    /// Whether a nav link should be highlighted.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(prefix)
        }
    }
}

/// Render a template, logging (not propagating) render failures.
pub(crate) fn render<T: Template>(template: &T) -> Response {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response()
}

/// Turn a failed list fetch into an on-page message instead of an error
/// page. An expired token still propagates so the user is sent to login.
///
/// # Errors
///
/// Returns `AppError::Api(Unauthorized)` for an expired token.
pub(crate) fn soft_fail<T: Default>(
    result: Result<T, StoreApiError>,
    what: &str,
) -> Result<(T, Option<String>), AppError> {
    match result {
        Ok(value) => Ok((value, None)),
        Err(StoreApiError::Unauthorized) => Err(AppError::Api(StoreApiError::Unauthorized)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch {what}");
            Ok((T::default(), Some(e.user_message())))
        }
    }
}

/// Split a failed backend write into what the form should show.
///
/// Client errors keep the backend's message and render as 422; anything
/// else is a 502 with a generic line.
///
/// # Errors
///
/// Returns `AppError::Api(Unauthorized)` for an expired token.
pub(crate) fn backend_form_error(
    error: StoreApiError,
    what: &str,
) -> Result<(StatusCode, FormErrors), AppError> {
    match error {
        StoreApiError::Unauthorized => Err(AppError::Api(StoreApiError::Unauthorized)),
        e @ (StoreApiError::Status { status: 400..=499, .. } | StoreApiError::NotFound(_)) => {
            tracing::info!(error = %e, "Backend rejected {what}");
            Ok((StatusCode::UNPROCESSABLE_ENTITY, FormErrors::form_level(e.user_message())))
        }
        e => {
            tracing::error!(error = %e, "Failed to save {what}");
            Ok((StatusCode::BAD_GATEWAY, FormErrors::form_level(e.user_message())))
        }
    }
}

/// Lenient `?page=` parsing; junk means the first page.
pub(crate) fn parse_page(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|p| p.trim().parse().ok())
}

/// Short date for list cells.
pub(crate) fn short_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%b %e, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Selected tab from a `?tab=` value, falling back to the first allowed one.
pub(crate) fn pick_tab<'a>(requested: Option<&str>, allowed: &[&'a str]) -> &'a str {
    requested
        .and_then(|tab| allowed.iter().copied().find(|t| *t == tab))
        .or_else(|| allowed.first().copied())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_tab() {
        let tabs = ["overview", "images", "inventory"];
        assert_eq!(pick_tab(Some("images"), &tabs), "images");
        assert_eq!(pick_tab(Some("bogus"), &tabs), "overview");
        assert_eq!(pick_tab(None, &tabs), "overview");
    }

    #[test]
    fn test_soft_fail() {
        let (items, message) =
            soft_fail::<Vec<u8>>(Err(StoreApiError::NotFound("x".to_string())), "items")
                .unwrap_or_default();
        assert!(items.is_empty());
        assert!(message.is_some());

        assert!(soft_fail::<Vec<u8>>(Err(StoreApiError::Unauthorized), "items").is_err());
    }

    #[test]
    fn test_backend_form_error_statuses() {
        let rejected = StoreApiError::Status {
            status: 409,
            message: "Code already exists".to_string(),
        };
        let (status, errors) = backend_form_error(rejected, "promotion").unwrap_or_else(|_| {
            panic!("client errors render the form");
        });
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(errors.general(), ["Code already exists".to_string()]);

        let down = StoreApiError::Status {
            status: 503,
            message: "maintenance".to_string(),
        };
        let (status, errors) =
            backend_form_error(down, "promotion").unwrap_or_else(|_| panic!("renders"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!errors.general()[0].contains("maintenance"));

        assert!(backend_form_error(StoreApiError::Unauthorized, "promotion").is_err());
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(Some("3")), Some(3));
        assert_eq!(parse_page(Some("abc")), None);
        assert_eq!(parse_page(None), None);
    }
}

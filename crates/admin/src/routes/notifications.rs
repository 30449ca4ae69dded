//! Notification popover and read-marking handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use storedesk_core::NotificationId;

use crate::{
    api::{Notification, StoreApiError},
    error::AppError,
    filters,
    middleware::{RequireAuth, set_flash},
    models::Flash,
    state::AppState,
};

use super::{render, soft_fail};

/// Most notifications shown in the popover.
const POPOVER_LIMIT: usize = 20;

/// Notification row in the popover.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub id: String,
    pub title: String,
    pub message: String,
    pub icon: &'static str,
    pub read: bool,
    pub link: Option<String>,
    pub age: String,
}

impl NotificationView {
    fn new(notification: &Notification, now: DateTime<Utc>) -> Self {
        Self {
            id: notification.id.to_string(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            icon: notification.kind.icon(),
            read: notification.read,
            link: notification
                .link
                .as_deref()
                .and_then(safe_local_path)
                .map(ToString::to_string),
            age: relative_age(notification.created_at, now),
        }
    }
}

/// Popover partial, fetched by the bell button.
#[derive(Template)]
#[template(path = "notifications/popover.html")]
pub struct PopoverTemplate {
    pub notifications: Vec<NotificationView>,
    pub unread: usize,
    pub error: Option<String>,
}

/// Where to go after marking read.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReadForm {
    pub next: String,
}

/// `path` when it is a same-site absolute path, rejecting scheme-relative
/// (`//host`) and backslash tricks.
pub(crate) fn safe_local_path(path: &str) -> Option<&str> {
    let path = path.trim();
    let ok = path.starts_with('/') && !path.starts_with("//") && !path.contains('\\');
    ok.then_some(path)
}

/// "just now", "5m ago", "3h ago", "2d ago", then a date.
fn relative_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        at.format("%b %e, %Y").to_string()
    }
}

/// Unread count.
pub(crate) fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

/// Newest first, capped for the popover.
fn latest(mut notifications: Vec<Notification>) -> Vec<Notification> {
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notifications.truncate(POPOVER_LIMIT);
    notifications
}

/// Notification popover partial.
#[instrument(skip(user, state))]
pub async fn popover(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let result = state
        .api()
        .list_all_notifications(&user.token, &user.store_id)
        .await;
    let (notifications, error) = soft_fail(result, "notifications")?;

    let now = Utc::now();
    let unread = unread_count(&notifications);
    let notifications = latest(notifications)
        .iter()
        .map(|n| NotificationView::new(n, now))
        .collect();

    Ok(render(&PopoverTemplate {
        notifications,
        unread,
        error,
    }))
}

/// Mark one notification read, then follow its link (or go back).
#[instrument(skip(user, state, session, form))]
pub async fn mark_read(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ReadForm>,
) -> Result<Redirect, AppError> {
    let id = NotificationId::new(id);
    match state
        .api()
        .mark_notification_read(&user.token, &user.store_id, &id)
        .await
    {
        Ok(()) => tracing::debug!(notification_id = %id, "Notification marked read"),
        Err(StoreApiError::Unauthorized) => return Err(AppError::Api(StoreApiError::Unauthorized)),
        Err(e) => {
            tracing::warn!(notification_id = %id, error = %e, "Failed to mark notification read");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Ok(Redirect::to(safe_local_path(&form.next).unwrap_or("/")))
}

/// Mark every notification read.
#[instrument(skip(user, state, session, form))]
pub async fn mark_all_read(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ReadForm>,
) -> Result<Redirect, AppError> {
    match state
        .api()
        .mark_all_notifications_read(&user.token, &user.store_id)
        .await
    {
        Ok(()) => {
            tracing::info!("All notifications marked read");
            set_flash(&session, Flash::success("All notifications marked as read")).await;
        }
        Err(StoreApiError::Unauthorized) => return Err(AppError::Api(StoreApiError::Unauthorized)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to mark notifications read");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Ok(Redirect::to(safe_local_path(&form.next).unwrap_or("/")))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn notification(id: &str, read: bool, created: DateTime<Utc>) -> Notification {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Notification {id}"),
            "read": read,
            "createdAt": created
        }))
        .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_safe_local_path() {
        assert_eq!(safe_local_path("/orders/12"), Some("/orders/12"));
        assert_eq!(safe_local_path("//evil.test/x"), None);
        assert_eq!(safe_local_path("https://evil.test"), None);
        assert_eq!(safe_local_path("/\\evil.test"), None);
        assert_eq!(safe_local_path(""), None);
    }

    #[test]
    fn test_relative_age() {
        let now = Utc::now();
        assert_eq!(relative_age(now - Duration::seconds(20), now), "just now");
        assert_eq!(relative_age(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(relative_age(now - Duration::hours(3), now), "3h ago");
        assert_eq!(relative_age(now - Duration::days(2), now), "2d ago");
    }

    #[test]
    fn test_latest_and_unread() {
        let now = Utc::now();
        let list: Vec<Notification> = (0..25)
            .map(|i| notification(&i.to_string(), i % 2 == 0, now - Duration::minutes(i)))
            .collect();

        assert_eq!(unread_count(&list), 12);
        let latest = latest(list);
        assert_eq!(latest.len(), POPOVER_LIMIT);
        assert_eq!(latest[0].id.as_str(), "0");
    }
}

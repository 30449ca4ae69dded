//! Session-related types for dashboard authentication.
//!
//! Types stored in the session for authentication state, notification
//! preferences and one-shot flash messages.

use serde::{Deserialize, Serialize};

use storedesk_core::{EmployeeRole, StoreId};

use crate::api::LoginResponse;

/// Session-stored identity of the signed-in employee.
///
/// The bearer token issued by the backend at login lives here and nowhere
/// else; it is never rendered into a page.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend bearer token.
    pub token: String,
    /// Store this user manages.
    pub store_id: StoreId,
    pub email: String,
    pub name: String,
    pub role: EmployeeRole,
}

impl CurrentUser {
    /// Owners and managers can change catalogue, promotions and settings.
    #[must_use]
    pub const fn can_manage(&self) -> bool {
        matches!(self.role, EmployeeRole::Owner | EmployeeRole::Manager)
    }
}

impl From<LoginResponse> for CurrentUser {
    fn from(login: LoginResponse) -> Self {
        Self {
            token: login.token,
            store_id: login.store_id,
            email: login.email,
            name: login.name,
            role: login.role,
        }
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("token", &"[REDACTED]")
            .field("store_id", &self.store_id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .finish()
    }
}

/// Notification widget toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    /// Play a sound when the unread count goes up.
    pub sound: bool,
    /// Show a desktop notification when the unread count goes up.
    pub desktop: bool,
}

/// Flash message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "toast toast-success",
            Self::Error => "toast toast-error",
        }
    }
}

/// A one-shot message shown on the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for notification widget preferences.
    pub const NOTIFICATION_PREFS: &str = "notification_prefs";

    /// Key for the pending flash message.
    pub const FLASH: &str = "flash";
}

//! Dashboard notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storedesk_core::{NotificationId, NotificationKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

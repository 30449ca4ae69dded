//! Session models for admin.

pub mod session;

pub use session::{CurrentUser, Flash, FlashKind, NotificationPrefs, keys as session_keys};

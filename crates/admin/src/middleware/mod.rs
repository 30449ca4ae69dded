//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Session layer (signed cookie, in-memory store)
//! 4. Expired-session cleanup (reacts to backend 401s)
//!
//! Authentication is enforced per handler through the extractors in [`auth`].

pub mod auth;
pub mod flash;
pub mod session;

pub use auth::{RequireAuth, RequireManager, clear_current_user, set_current_user};
pub use flash::{set_flash, take_flash};
pub use session::{SESSION_COOKIE_NAME, clear_expired_session, create_session_layer};

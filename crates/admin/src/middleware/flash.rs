//! One-shot flash messages carried through a redirect.

use tower_sessions::Session;

use crate::models::{Flash, session_keys};

/// Queue a message for the next rendered page.
///
/// Failures are logged and otherwise ignored; losing a toast is not worth
/// failing the request over.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Take the pending message, if any. A message is shown once.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    match session.remove::<Flash>(session_keys::FLASH).await {
        Ok(flash) => flash,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        set_flash(&session, Flash::success("Product saved")).await;
        assert_eq!(
            take_flash(&session).await,
            Some(Flash::success("Product saved"))
        );
        assert_eq!(take_flash(&session).await, None);
    }
}

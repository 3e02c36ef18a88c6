//! One-shot flash messages stored in the session.
//!
//! Handlers push a message before redirecting; the next rendered page takes
//! (and thereby clears) all pending messages.

use tower_sessions::Session;

use crate::models::{FlashLevel, FlashMessage, session_keys};

/// Append a flash message to the session.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn push(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<FlashMessage> = session
        .get(session_keys::FLASH)
        .await?
        .unwrap_or_default();
    pending.push(FlashMessage {
        level,
        message: message.into(),
    });
    session.insert(session_keys::FLASH, pending).await
}

/// Remove and return every pending flash message.
///
/// Store failures are logged and yield no messages; a page should still render
/// when the notice is lost.
pub async fn take(session: &Session) -> Vec<FlashMessage> {
    match session.remove::<Vec<FlashMessage>>(session_keys::FLASH).await {
        Ok(pending) => pending.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read flash messages: {e}");
            Vec::new()
        }
    }
}

/// Push a success message, logging instead of failing the request.
pub async fn success(session: &Session, message: impl Into<String>) {
    if let Err(e) = push(session, FlashLevel::Success, message).await {
        tracing::warn!("Failed to store flash message: {e}");
    }
}

/// Push an error message, logging instead of failing the request.
pub async fn error(session: &Session, message: impl Into<String>) {
    if let Err(e) = push(session, FlashLevel::Error, message).await {
        tracing::warn!("Failed to store flash message: {e}");
    }
}

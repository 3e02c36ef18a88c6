//! Admin flag management.
//!
//! The storefront has no UI for changing `users.is_admin`; this is the only
//! way to do it.
//!
//! ```bash
//! shopfront-cli admin grant alice
//! shopfront-cli admin revoke alice
//! ```

use thiserror::Error;

use shopfront_storefront::db::{RepositoryError, UserRepository};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No account has that username.
    #[error("No user named {0:?}")]
    UnknownUser(String),

    /// Database error.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Set or clear the admin flag for `username`.
///
/// Takes effect on the user's next admin request; no re-login needed.
///
/// # Errors
///
/// Returns `AdminError::UnknownUser` if the account doesn't exist.
pub async fn set_admin(username: &str, is_admin: bool) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let user = UserRepository::new(&pool)
        .set_admin(username, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UnknownUser(username.to_owned()),
            other => AdminError::Repository(other),
        })?;

    if user.is_admin {
        tracing::info!(user_id = %user.id, "Granted admin to {}", user.username);
    } else {
        tracing::info!(user_id = %user.id, "Revoked admin from {}", user.username);
    }

    Ok(())
}

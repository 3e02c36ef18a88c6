//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts (argon2 password hashes, `is_admin` flag)
//! - `products` - Catalog
//! - `cart` - One row per (user, product) with a quantity
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p shopfront-cli -- migrate
//! ```

pub mod cart;
pub mod products;
pub mod users;

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::CartRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

use crate::config::DatabaseConfig;

/// Errors that can occur during repository operations.
///
/// `sqlx::Error` is classified once, in the `From` impl, so handlers can match
/// on the kind of failure instead of inspecting driver errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Unique, foreign-key, or check constraint rejected the write.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The database could not be reached.
    #[error("database unavailable: {0}")]
    Connection(#[source] sqlx::Error),

    /// Requested row does not exist.
    #[error("not found")]
    NotFound,

    /// Any other database error.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(ref db_err)
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation() =>
            {
                Self::Conflict(
                    db_err
                        .constraint()
                        .map_or_else(|| db_err.message().to_owned(), ToOwned::to_owned),
                )
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection(err),
            other => Self::Database(other),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(config.connect_options())
        .await
}

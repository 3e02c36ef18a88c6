//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use sqlx::PgPool;

use shopfront_storefront::config::DatabaseConfig;
use shopfront_storefront::db;

/// Load `.env`, read the `DB_*` settings, and connect.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = DatabaseConfig::from_env()?;
    tracing::info!(host = %config.host, database = %config.database, "Connecting to database...");

    Ok(db::create_pool(&config).await?)
}

//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use std::path::PathBuf;

use sqlx::SqlitePool;

/// Open the pool for the configured database, loading `.env` if present.
pub async fn open_pool() -> Result<SqlitePool, sqlx::Error> {
    let _ = dotenvy::dotenv();
    let path = PathBuf::from(
        std::env::var("WARUNG_DATABASE_PATH").unwrap_or_else(|_| "warung.db".to_string()),
    );
    warung_server::db::create_pool(&path).await
}

//! Database operations for the Warung SQLite store.
//!
//! # Tables
//!
//! - `users` - Accounts (shoppers and admins), unique username/email
//! - `products` - Catalog rows, optional image key
//! - `cart` - Cart rows, one per (user, product), cascade-deleted with users
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and are embedded into the
//! binary via `sqlx::migrate!`. They run on server startup and via:
//! ```bash
//! cargo run -p warung-cli -- migrate
//! ```

pub mod cart;
pub mod products;
pub mod users;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use cart::CartRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded migrations from `crates/server/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username/email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a SQLite connection pool with sensible defaults.
///
/// WAL journal mode for concurrent reads, foreign keys on (SQLite disables
/// them by default), file created if missing.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let url = format!("sqlite://{}?mode=rwc", database_path.display());
    let options = SqliteConnectOptions::from_str(&url)?
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Create an in-memory SQLite pool with migrations applied (for tests).
///
/// A single connection is used so all handles see the same in-memory
/// database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the pool cannot be created or a migration fails.
pub async fn create_pool_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await.map_err(sqlx::Error::from)?;

    Ok(pool)
}

/// Run all pending migrations against the given pool.
///
/// Idempotent: applied migrations are tracked in `_sqlx_migrations`.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations");
    MIGRATOR.run(pool).await?;
    tracing::info!("Migrations complete");
    Ok(())
}

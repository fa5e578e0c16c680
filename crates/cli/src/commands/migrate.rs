//! Database migration command.

use super::open_pool;

/// Run all pending migrations.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = open_pool().await?;
    warung_server::db::run_migrations(&pool).await?;
    println!("Migrations complete");
    Ok(())
}

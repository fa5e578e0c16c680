//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! warung-cli admin create -u admin -e admin@warung.local -p <password>
//! ```

use warung_server::services::auth::AuthService;

use super::open_pool;

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error if validation fails, the database is unreachable, or
/// a user with the username already exists.
pub async fn create(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = open_pool().await?;
    warung_server::db::run_migrations(&pool).await?;

    let created = AuthService::new(&pool)
        .ensure_admin(username, email, password)
        .await?;

    match created {
        Some(admin) => println!("Created admin '{}' (id {})", admin.username, admin.id),
        None => return Err(format!("user '{username}' already exists").into()),
    }

    Ok(())
}

//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use warung_core::{Email, Role, UserId, Username};

use super::RepositoryError;
use crate::models::User;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: Role = row.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            email,
            role,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for queries that also need the password hash.
#[derive(Debug, sqlx::FromRow)]
struct UserAuthRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserAuthRow> for (User, String) {
    type Error = RepositoryError;

    fn try_from(row: UserAuthRow) -> Result<Self, Self::Error> {
        let user = UserRow {
            id: row.id,
            username: row.username,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
        }
        .try_into()?;

        Ok((user, row.password_hash))
    }
}

/// Changes for a partial profile update.
///
/// Only `Some` fields are written; the update statement enumerates exactly
/// the provided columns through a bound query builder (no SQL string
/// concatenation of values).
#[derive(Debug, Default)]
pub struct UserChanges {
    /// New username, if changing.
    pub username: Option<Username>,
    /// New email, if changing.
    pub email: Option<Email>,
    /// New password hash, if changing the password.
    pub password_hash: Option<String>,
}

impl UserChanges {
    /// Whether no field was provided.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email already
    /// exists. Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, username, email, role, created_at
            ",
        )
        .bind(username.as_str())
        .bind(email.as_str())
        .bind(password_hash)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username or email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, role, created_at
            FROM users
            WHERE id = ?1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their exact username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, role, created_at
            FROM users
            WHERE username = ?1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Look up a user and their password hash by login identifier.
    ///
    /// The identifier matches either the username or the email address.
    /// Returns `None` if no account matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_with_password_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            r"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE username = ?1 OR email = ?1
            ",
        )
        .bind(identifier)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Whether an email is already used by a different user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_email_taken(
        &self,
        email: &Email,
        exclude: UserId,
    ) -> Result<bool, RepositoryError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = ?1 AND id != ?2")
                .bind(email.as_str())
                .bind(exclude.as_i64())
                .fetch_optional(self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Whether a username is already used by a different user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_username_taken(
        &self,
        username: &Username,
        exclude: UserId,
    ) -> Result<bool, RepositoryError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = ?1 AND id != ?2")
                .bind(username.as_str())
                .bind(exclude.as_i64())
                .fetch_optional(self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Partially update a user's profile.
    ///
    /// Only the fields present in `changes` are written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist or
    /// `changes` is empty. Returns `RepositoryError::Conflict` if the new
    /// username or email is already taken.
    pub async fn update_profile(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<User, RepositoryError> {
        if changes.is_empty() {
            return Err(RepositoryError::NotFound);
        }

        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE users SET ");
        let mut fields = builder.separated(", ");
        if let Some(username) = &changes.username {
            fields.push("username = ");
            fields.push_bind_unseparated(username.as_str());
        }
        if let Some(email) = &changes.email {
            fields.push("email = ");
            fields.push_bind_unseparated(email.as_str());
        }
        if let Some(password_hash) = &changes.password_hash {
            fields.push("password_hash = ");
            fields.push_bind_unseparated(password_hash.as_str());
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id.as_i64());
        builder.push(" RETURNING id, username, email, role, created_at");

        let row = builder
            .build_query_as::<UserRow>()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "username or email already exists".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a user and all of their cart rows in one transaction.
    ///
    /// The explicit cart delete is belt-and-braces alongside the
    /// `ON DELETE CASCADE` foreign key; both statements commit or roll back
    /// together.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_with_cart(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart WHERE user_id = ?1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_pool_in_memory;

    async fn repo_pool() -> SqlitePool {
        create_pool_in_memory().await.unwrap()
    }

    fn username(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = repo_pool().await;
        let repo = UserRepository::new(&pool);

        let user = repo
            .create(&username("alice"), &email("a@x.com"), "hash", Role::User)
            .await
            .unwrap();
        assert_eq!(user.username.as_str(), "alice");
        assert_eq!(user.role, Role::User);

        let fetched = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.email.as_str(), "a@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let pool = repo_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&username("alice"), &email("a@x.com"), "hash", Role::User)
            .await
            .unwrap();
        let err = repo
            .create(&username("alice"), &email("b@x.com"), "hash", Role::User)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let pool = repo_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&username("alice"), &email("a@x.com"), "hash", Role::User)
            .await
            .unwrap();
        let err = repo
            .create(&username("bob"), &email("a@x.com"), "hash", Role::User)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_identifier_matches_username_or_email() {
        let pool = repo_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&username("alice"), &email("a@x.com"), "hash", Role::User)
            .await
            .unwrap();

        let (by_name, hash) = repo
            .get_with_password_by_identifier("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hash, "hash");

        let (by_email, _) = repo
            .get_with_password_by_identifier("a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, by_email.id);

        assert!(
            repo.get_with_password_by_identifier("nobody")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_partial_update_only_touches_provided_fields() {
        let pool = repo_pool().await;
        let repo = UserRepository::new(&pool);

        let user = repo
            .create(&username("alice"), &email("a@x.com"), "hash", Role::User)
            .await
            .unwrap();

        let updated = repo
            .update_profile(
                user.id,
                &UserChanges {
                    email: Some(email("new@x.com")),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username.as_str(), "alice");
        assert_eq!(updated.email.as_str(), "new@x.com");
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_conflict() {
        let pool = repo_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&username("alice"), &email("a@x.com"), "hash", Role::User)
            .await
            .unwrap();
        let bob = repo
            .create(&username("bob"), &email("b@x.com"), "hash", Role::User)
            .await
            .unwrap();

        let err = repo
            .update_profile(
                bob.id,
                &UserChanges {
                    email: Some(email("a@x.com")),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let pool = repo_pool().await;
        let repo = UserRepository::new(&pool);

        let err = repo.delete_with_cart(UserId::new(99)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}

//! Authentication and account service.
//!
//! Registration, login, profile updates, and account deletion. Passwords
//! are hashed with Argon2id.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use warung_core::{Email, Role, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::{UserChanges, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Raw profile update fields, as received from the client.
///
/// Empty strings are treated the same as absent fields.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    /// New username, if changing.
    pub username: Option<String>,
    /// New email, if changing.
    pub email: Option<String>,
    /// New password, if changing.
    pub password: Option<String>,
}

/// Authentication and account service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` or `AuthError::InvalidEmail` on
    /// malformed input, `AuthError::WeakPassword` if the password is too
    /// short, and `AuthError::UserAlreadyExists` if the username or email is
    /// already registered.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &email, &password_hash, Role::User)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Log in with a username or email plus password.
    ///
    /// The same error is returned whether the account is missing or the
    /// password is wrong, so the response doesn't leak which accounts exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the identifier/password
    /// pair doesn't match an account.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password_by_identifier(identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get the profile for an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn profile(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NothingToUpdate` if no field was provided,
    /// validation errors for malformed fields, and `AuthError::EmailTaken`
    /// or `AuthError::UsernameTaken` when the new value collides with
    /// another account.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, AuthError> {
        let mut changes = UserChanges::default();

        if let Some(username) = non_empty(update.username) {
            let username = Username::parse(&username)?;
            if self.users.is_username_taken(&username, user_id).await? {
                return Err(AuthError::UsernameTaken);
            }
            changes.username = Some(username);
        }
        if let Some(email) = non_empty(update.email) {
            let email = Email::parse(&email)?;
            if self.users.is_email_taken(&email, user_id).await? {
                return Err(AuthError::EmailTaken);
            }
            changes.email = Some(email);
        }
        if let Some(password) = non_empty(update.password) {
            validate_password(&password)?;
            changes.password_hash = Some(hash_password(&password)?);
        }

        if changes.is_empty() {
            return Err(AuthError::NothingToUpdate);
        }

        let user = self
            .users
            .update_profile(user_id, &changes)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                // Pre-checks above race with concurrent writers; the unique
                // index is the backstop.
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Delete an account along with its cart rows.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn delete_account(&self, user_id: UserId) -> Result<(), AuthError> {
        self.users
            .delete_with_cart(user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Ensure an admin account exists, creating it if necessary.
    ///
    /// Used at startup for bootstrap. Does nothing if the username is
    /// already registered.
    ///
    /// # Errors
    ///
    /// Returns validation or repository errors from the create path.
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        if self.users.get_by_username(username).await?.is_some() {
            return Ok(None);
        }

        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &email, &password_hash, Role::Admin)
            .await?;

        Ok(Some(user))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

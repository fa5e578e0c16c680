//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication and account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] warung_core::UsernameError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] warung_core::EmailError),

    /// Password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Invalid credentials (wrong password or no matching account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username or email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Email already used by another account.
    #[error("email already taken")]
    EmailTaken,

    /// Username already used by another account.
    #[error("username already taken")]
    UsernameTaken,

    /// Profile update carried no fields.
    #[error("nothing to update")]
    NothingToUpdate,

    /// Account not found.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

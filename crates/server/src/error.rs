//! Unified error handling.
//!
//! Provides a unified `AppError` type mapping domain errors to HTTP status
//! codes and client-facing Indonesian messages. All route handlers should
//! return `Result<T, AppError>`. Every error body has the shape
//! `{"message": "..."}`; internal details are logged, never exposed.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::images::ImageError;

/// Generic message for anything the client shouldn't see details of.
const SERVER_ERROR_MESSAGE: &str = "Terjadi kesalahan server";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// No bearer token on a protected route.
    #[error("missing token")]
    TokenMissing,

    /// Bearer token failed verification.
    #[error("invalid token")]
    TokenInvalid,

    /// Caller's role doesn't permit this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Authentication/account operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Image upload failed.
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::TokenMissing | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(err) => match err {
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::Repository(RepositoryError::Database(_) | RepositoryError::DataCorruption(_))
                | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Image(err) => match err {
                ImageError::TooLarge
                | ImageError::UnsupportedType
                | ImageError::InvalidImage => StatusCode::BAD_REQUEST,
                ImageError::Io(_) | ImageError::Task => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::TokenMissing => "Token tidak ditemukan".to_string(),
            Self::TokenInvalid => "Token tidak valid".to_string(),
            Self::Forbidden(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Auth(err) => match err {
                AuthError::InvalidUsername(_) => "Username tidak valid".to_string(),
                AuthError::InvalidEmail(_) => "Format email tidak valid".to_string(),
                AuthError::WeakPassword(_) => "Password minimal 6 karakter".to_string(),
                AuthError::InvalidCredentials => {
                    "Username/email atau password salah".to_string()
                }
                AuthError::UserAlreadyExists => {
                    "Username atau email sudah digunakan".to_string()
                }
                AuthError::EmailTaken => "Email sudah digunakan".to_string(),
                AuthError::UsernameTaken => "Username sudah digunakan".to_string(),
                AuthError::NothingToUpdate => "Tidak ada data untuk update".to_string(),
                AuthError::UserNotFound => "User tidak ditemukan".to_string(),
                AuthError::Repository(RepositoryError::Conflict(_)) => {
                    "Username atau email sudah digunakan".to_string()
                }
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    SERVER_ERROR_MESSAGE.to_string()
                }
            },
            Self::Image(err) => match err {
                ImageError::TooLarge => "Ukuran gambar maksimal 2MB".to_string(),
                ImageError::UnsupportedType | ImageError::InvalidImage => {
                    "Hanya boleh upload file gambar (jpg, jpeg, png, webp)".to_string()
                }
                ImageError::Io(_) | ImageError::Task => SERVER_ERROR_MESSAGE.to_string(),
            },
            Self::Database(err) => match err {
                RepositoryError::NotFound => "Data tidak ditemukan".to_string(),
                RepositoryError::Conflict(_) => "Data sudah digunakan".to_string(),
                _ => SERVER_ERROR_MESSAGE.to_string(),
            },
            Self::Internal(_) => SERVER_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request error");
        }

        let body = Json(json!({ "message": self.message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

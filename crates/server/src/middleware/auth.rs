//! Request authentication.
//!
//! `CurrentUser` is an extractor; adding it to a handler's arguments makes
//! the route require a valid bearer token.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use warung_core::{Role, UserId};

use crate::error::AppError;
use crate::services::token::extract_bearer_token;
use crate::state::AppState;

/// The authenticated caller, as carried in the token claims.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User ID from the token.
    pub id: UserId,
    /// Username at token issue time.
    pub username: String,
    /// Role at token issue time.
    pub role: Role,
}

impl CurrentUser {
    /// Reject non-admin callers.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the caller is not an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Akses hanya untuk admin".to_string()))
        }
    }

    /// Reject admin callers with an operation-specific message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the caller is an admin.
    pub fn forbid_admin(&self, message: &str) -> Result<(), AppError> {
        if self.role.is_admin() {
            Err(AppError::Forbidden(message.to_string()))
        } else {
            Ok(())
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = extract_bearer_token(header).ok_or(AppError::TokenMissing)?;

        let claims = state
            .tokens()
            .verify(token)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(Self {
            id: claims.user_id(),
            username: claims.username,
            role: claims.role,
        })
    }
}

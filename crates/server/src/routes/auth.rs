//! Authentication route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request body. The identifier is a username or an email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    let (Some(username), Some(email), Some(password)) = (
        body.username.filter(|v| !v.trim().is_empty()),
        body.email.filter(|v| !v.trim().is_empty()),
        body.password.filter(|v| !v.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Username, email, dan password wajib diisi".to_string(),
        ));
    };

    let service = AuthService::new(state.pool());
    let user = service.register(&username, &email, &password).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok(Json(json!({ "message": "Registrasi berhasil" })))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (Some(identifier), Some(password)) = (body.identifier, body.password) else {
        return Err(AppError::Auth(
            crate::services::auth::AuthError::InvalidCredentials,
        ));
    };

    let service = AuthService::new(state.pool());
    let user = service.login(&identifier, &password).await?;

    let token = state
        .tokens()
        .issue(&user)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        message: "Login berhasil",
        token,
        username: user.username.as_str().to_owned(),
        email: user.email.as_str().to_owned(),
        role: user.role.as_str().to_owned(),
    }))
}

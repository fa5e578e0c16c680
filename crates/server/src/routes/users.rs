//! User profile route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::services::auth::{AuthService, ProfileUpdate};
use crate::state::AppState;

/// Profile update request body. Absent or blank fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `GET /api/users/me`
pub async fn profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool()).profile(current.id).await?;
    Ok(Json(user))
}

/// `PUT /api/users/me`
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let update = ProfileUpdate {
        username: body.username,
        email: body.email,
        password: body.password,
    };

    let user = AuthService::new(state.pool())
        .update_profile(current.id, update)
        .await?;
    tracing::info!(user_id = %user.id, "profile updated");

    Ok(Json(user))
}

/// `DELETE /api/users/me`
pub async fn delete_account(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Value>> {
    AuthService::new(state.pool())
        .delete_account(current.id)
        .await?;
    tracing::info!(user_id = %current.id, "account deleted");

    Ok(Json(json!({ "message": "Akun berhasil dihapus" })))
}

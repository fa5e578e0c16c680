//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                     - Running banner
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (pings the database)
//! GET    /uploads/{key}        - Static product images
//!
//! # Auth
//! POST   /api/auth/register    - Create an account
//! POST   /api/auth/login       - Exchange credentials for a bearer token
//!
//! # Profile (bearer token required)
//! GET    /api/users/me         - Current profile
//! PUT    /api/users/me         - Partial profile update
//! DELETE /api/users/me         - Delete account and cart
//!
//! # Products (writes require admin)
//! GET    /api/products         - List catalog
//! GET    /api/products/{id}    - Product detail
//! POST   /api/products         - Create (multipart, optional image)
//! PUT    /api/products/{id}    - Update (multipart, optional new image)
//! DELETE /api/products/{id}    - Delete row and image file
//!
//! # Cart (bearer token required, mutations forbidden for admins)
//! GET    /api/cart             - List cart joined with products
//! POST   /api/cart             - Add/fold a product into the cart
//! PUT    /api/cart/{id}        - Set quantity
//! DELETE /api/cart/{id}        - Remove line
//! ```

pub mod auth;
pub mod cart;
pub mod products;
pub mod users;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::state::AppState;

/// Body limit for multipart product writes. Generous enough that the
/// 2 MB image rule is enforced by the image pipeline with its own
/// message instead of a bare 413.
const PRODUCT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the profile routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/me",
        get(users::profile)
            .put(users::update_profile)
            .delete(users::delete_account),
    )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .layer(DefaultBodyLimit::max(PRODUCT_BODY_LIMIT))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::list).post(cart::add))
        .route("/{id}", put(cart::update).delete(cart::remove))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/auth", auth_routes())
        .nest("/api/users", user_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .fallback(not_found)
}

/// Root banner.
async fn root() -> &'static str {
    "Warung API sedang berjalan"
}

/// Liveness check.
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Readiness check; verifies the database answers.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// JSON 404 for unknown routes.
async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Endpoint tidak ditemukan" })),
    )
}

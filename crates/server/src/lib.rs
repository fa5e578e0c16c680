//! Warung API server library.
//!
//! A small storefront backend: accounts, a product catalog with image
//! upload, and per-user shopping carts. Exposed as a library so the CLI
//! and integration tests can reuse the router and services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Build the complete application router.
///
/// Product images are served statically from the image store's directory
/// under `/uploads`.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.images().root());

    routes::routes()
        .nest_service("/uploads", uploads)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

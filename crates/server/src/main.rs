//! Warung API server binary.
//!
//! Serves the storefront API: auth, product catalog with image upload,
//! and per-user carts. Configuration comes from the environment (see
//! `config::ServerConfig`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use secrecy::ExposeSecret;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warung_server::config::ServerConfig;
use warung_server::services::auth::AuthService;
use warung_server::state::AppState;
use warung_server::{app, db};

#[tokio::main]
async fn main() {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warung_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().expect("Failed to load configuration");

    let pool = db::create_pool(&config.database_path)
        .await
        .expect("Failed to create database pool");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    tracing::info!("database ready");

    bootstrap_admin(&config, &pool).await;

    let addr = config.socket_addr();
    let state = AppState::new(config, pool)
        .await
        .expect("Failed to initialize application state");

    let router = app(state);

    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Create the admin account on first run, when a bootstrap password is
/// configured and the username is free.
async fn bootstrap_admin(config: &ServerConfig, pool: &sqlx::SqlitePool) {
    let bootstrap = &config.admin_bootstrap;
    let Some(password) = &bootstrap.password else {
        return;
    };

    match AuthService::new(pool)
        .ensure_admin(
            &bootstrap.username,
            &bootstrap.email,
            password.expose_secret(),
        )
        .await
    {
        Ok(Some(admin)) => tracing::info!(username = %admin.username, "admin account created"),
        Ok(None) => tracing::debug!("admin account already present"),
        Err(e) => tracing::error!(error = %e, "admin bootstrap failed"),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, starting graceful shutdown");
}

//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;

use crate::config::ServerConfig;
use crate::services::images::{ImageError, ImageStore};
use crate::services::token::TokenService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the connection pool,
/// the image store, and the token service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: SqlitePool,
    images: ImageStore,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload directory cannot be created.
    pub async fn new(config: ServerConfig, pool: SqlitePool) -> Result<Self, ImageError> {
        let images = ImageStore::new(&config.upload_dir).await?;
        let tokens = TokenService::new(
            config.jwt_secret.expose_secret().as_bytes(),
            config.token_ttl_secs,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                pool,
                images,
                tokens,
            }),
        })
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the image store.
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}

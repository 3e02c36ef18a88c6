//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::ImageStore;

/// Application state shared across all handlers.
///
/// Cheap to clone; the pool and image store live behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    images: ImageStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Product images are stored under the configured upload directory.
    #[must_use]
    pub fn new(config: &StorefrontConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                images: ImageStore::new(&config.upload_dir),
            }),
        }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the product image store.
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }
}

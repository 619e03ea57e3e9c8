/**
 * Application State Management
 *
 * `AppState` is the central state container handed to every handler. It
 * holds the SQLite pool, the read-only configuration and the optional
 * media store. Nothing in it is mutated per request; the pool does its
 * own synchronization.
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract just the part they
 * need:
 *
 * ```rust
 * use axum::extract::State;
 * use sqlx::SqlitePool;
 *
 * async fn handler(State(pool): State<SqlitePool>) {
 *     // ...
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::server::config::ServerConfig;
use crate::backend::uploads::media::MediaStore;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub pool: SqlitePool,

    /// Server configuration, fixed at startup
    pub config: Arc<ServerConfig>,

    /// Media host for uploads
    ///
    /// `None` when no media host is configured; the upload route then
    /// answers 503.
    pub media: Option<Arc<dyn MediaStore>>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        config: ServerConfig,
        media: Option<Arc<dyn MediaStore>>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            media,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

/**
 * Server Initialization
 *
 * Turns a `ServerConfig` into a ready-to-serve router.
 *
 * # Initialization Process
 *
 * 1. Open the database and run migrations
 * 2. Seed demo data when enabled
 * 3. Build the media store when configured
 * 4. Create the router
 */

use std::sync::Arc;

use axum::Router;
use thiserror::Error;

use crate::backend::routes::router::create_router;
use crate::backend::seed::{seed_demo_data, SeedError};
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::uploads::media::{HostedMediaStore, MediaStore};

/// Startup failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("database unavailable: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Create and configure the Axum application
///
/// # Arguments
///
/// * `config` - Loaded server configuration
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Errors
///
/// Fails if the database cannot be opened or migrated, or if seeding was
/// requested and failed. Unlike the database, a missing media host is not an
/// error; uploads answer 503 instead.
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, InitError> {
    tracing::info!(
        "Initializing Quill backend ({:?} environment)",
        config.environment
    );

    // Step 1: Database
    let pool = load_database(&config.database_url).await.map_err(|e| {
        tracing::error!("Failed to open database {}: {}", config.database_url, e);
        e
    })?;

    // Step 2: Demo data
    if config.seed_demo {
        let summary = seed_demo_data(&pool, config.bcrypt_cost).await?;
        if summary.is_empty() {
            tracing::info!("Demo seed requested but database already populated");
        }
    }

    // Step 3: Media host
    let media: Option<Arc<dyn MediaStore>> = match &config.media {
        Some(media_config) => {
            tracing::info!("Uploads go to media folder '{}'", media_config.folder);
            Some(Arc::new(HostedMediaStore::new(media_config)))
        }
        None => {
            tracing::warn!("No media host configured; uploads are disabled");
            None
        }
    };

    // Step 4: Router
    let app = create_router(AppState::new(pool, config, media));
    tracing::info!("Router configured");

    Ok(app)
}

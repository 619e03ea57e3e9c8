/**
 * Router Configuration
 *
 * Combines the service banner, the API routes and the JSON 404 fallback
 * into one Axum router, then wraps it in the shared middleware stack.
 *
 * # Layer Order (outermost first)
 *
 * 1. `TraceLayer` - per-request logging
 * 2. `CorsLayer` - origin allowlist from configuration
 * 3. `DefaultBodyLimit` - 10 MiB request bodies
 * 4. `reveal_fault_detail` - development-only fault messages
 */

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::{reveal_fault_detail, ApiError};
use crate::backend::routes::api_routes::api_routes;
use crate::backend::server::state::AppState;

/// Largest accepted request body outside the upload route
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Body of `GET /`
#[derive(Debug, Serialize)]
pub struct ServiceBanner {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

async fn banner() -> Json<ServiceBanner> {
    Json(ServiceBanner {
        message: "Quill Blog API Server",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// CORS policy for the configured front-end origins
///
/// Origins that fail to parse as header values are skipped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Shared state handed to every handler
///
/// # Returns
///
/// Router ready to serve
///
/// # Routes
///
/// - `GET /` - Service banner
/// - `/api/...` - See `api_routes`
/// - anything else - `404 {success:false, message:"Route not found"}`
pub fn create_router(app_state: AppState) -> Router<()> {
    let cors = cors_layer(&app_state.config.cors_origins);

    Router::new()
        .route("/", get(banner))
        .merge(api_routes())
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            reveal_fault_detail,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(BODY_LIMIT)),
        )
        .with_state(app_state)
}


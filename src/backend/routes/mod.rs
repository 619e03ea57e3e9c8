//! Route Configuration Module
//!
//! HTTP routes for the backend server, organized into focused submodules:
//!
//! - **`router`** - Top-level router, middleware stack and fallback
//! - **`api_routes`** - Resource endpoints under `/api`
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports
//! ├── router.rs       - Main router creation
//! └── api_routes.rs   - API endpoints
//! ```

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;

//! Backend Module
//!
//! All server-side code for Quill: an Axum HTTP server exposing the blog's
//! REST API over a SQLite database.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, app assembly
//! - **`routes`** - Router, middleware stack and fallback
//! - **`auth`** - Accounts, password hashing and JWT sessions
//! - **`middleware`** - Bearer-token extractor and ownership checks
//! - **`posts`** - Posts resource
//! - **`categories`** - Categories resource
//! - **`comments`** - Comments and replies
//! - **`uploads`** - Image uploads proxied to a media host
//! - **`seed`** - Demo data for fresh databases
//! - **`error`** - `ApiError` and its JSON rendering
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── seed.rs         - Demo data
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request extractors
//! ├── posts/          - Posts
//! ├── categories/     - Categories
//! ├── comments/       - Comments
//! ├── uploads/        - Uploads
//! └── error/          - Error types
//! ```
//!
//! # Error Handling
//!
//! Handlers return `Result<_, ApiError>` and use `?`. Every error renders
//! the same JSON envelope as a successful response, with `success: false`.
//!
//! # Example
//!
//! ```rust,no_run
//! use quill::backend::server::{config::ServerConfig, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Blog posts
pub mod posts;

/// Post categories
pub mod categories;

/// Comments and replies
pub mod comments;

/// Image uploads
pub mod uploads;

/// Demo data
pub mod seed;

pub use error::ApiError;
pub use server::create_app;

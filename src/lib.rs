//! Quill - Main Library
//!
//! Quill is a small blogging platform: users publish posts, organize them
//! into categories, and discuss them in threaded comments.
//!
//! # Module Structure
//!
//! - **`shared`** - Types used by both halves
//!   - Domain models, the response envelope, field validation
//!   - The ownership rule (`authz`) enforced by the server and mirrored by the client
//!
//! - **`backend`** - REST API server (only compiled with `ssr` feature)
//!   - Axum routes under `/api`, SQLite persistence via sqlx
//!   - JWT bearer authentication, bcrypt password hashing
//!   - Image uploads to a hosted media service
//!
//! - **`client`** - Data-synchronization layer for a UI
//!   - Typed API client with an explicit session context
//!   - Query cache with invalidation and refetch
//!   - Optimistic mutations with snapshot and rollback
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the `backend` module and the `quill-server` binary
//!
//! # Usage
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

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Client data layer
pub mod client;

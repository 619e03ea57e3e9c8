//! Typed API calls
//!
//! One file per resource, each adding methods to `ApiClient`. Paths are
//! relative to the configured base URL (which already ends in `/api`).

/// Register, login, profile
pub mod auth;

/// Posts
pub mod posts;

/// Categories
pub mod categories;

/// Comments
pub mod comments;

/// Image uploads
pub mod uploads;

pub use posts::PostPage;

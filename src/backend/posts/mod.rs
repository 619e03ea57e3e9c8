//! Posts Module
//!
//! Blog posts: paginated listing, reads that count views, and
//! author-or-admin gated updates and deletes.

/// Database operations
pub mod db;

/// HTTP handlers
pub mod handlers;

pub use handlers::{create_post, delete_post, get_post, list_posts, update_post};

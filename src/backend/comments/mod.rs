//! Comments Module
//!
//! Comments and threaded replies on posts. Deleting a comment first
//! removes it from its post's list and its parent's reply list.

/// Database operations
pub mod db;

/// HTTP handlers
pub mod handlers;

pub use handlers::{create_comment, delete_comment, list_post_comments, update_comment};

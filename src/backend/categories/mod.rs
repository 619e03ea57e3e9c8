//! Categories Module
//!
//! Site-wide post categories. Anyone can read them; only admins can
//! create, rename or delete them.

/// Database operations
pub mod db;

/// HTTP handlers
pub mod handlers;

pub use handlers::{
    create_category, delete_category, get_category, list_categories, update_category,
};

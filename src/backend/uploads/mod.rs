//! Uploads Module
//!
//! Image uploads proxied to a hosted media service.

/// Upload route handler
pub mod handlers;

/// Media host client
pub mod media;

pub use handlers::upload_image;
pub use media::{HostedMediaStore, MediaError, MediaStore, UploadedFile};

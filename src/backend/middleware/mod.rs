//! Middleware Module
//!
//! Request-processing pieces shared by the route handlers: the
//! authenticated-user extractor and the ownership checks built on the
//! shared ownership rule.

/// Authentication extractor and ownership checks
pub mod auth;

pub use auth::{ensure_admin, ensure_can_modify, AuthUser, AuthenticatedUser};

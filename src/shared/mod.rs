//! Shared Module
//!
//! Types and rules used by both the API server and the client library:
//! resource shapes, the response envelope, request validation and the
//! ownership rule.

/// Shared error types
pub mod error;

/// Response envelope and pagination
pub mod envelope;

/// Resource and request shapes
pub mod models;

/// Ownership and role rule
pub mod authz;

/// Request validation
pub mod validation;

/// Slug and excerpt helpers
pub mod text;

pub use authz::{may_administer, may_modify, Actor};
pub use envelope::{Envelope, Pagination};
pub use error::{FieldError, SharedError};
pub use models::{
    AuthPayload, AuthorSummary, Category, CategorySummary, Comment, Post, PostStatus, Role,
    UserProfile,
};

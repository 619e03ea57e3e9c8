//! Shared Error Types
//!
//! Error and field-error types used on both sides of the API. The server
//! renders `FieldError` lists inside failure envelopes; the client decodes
//! the same list and turns it into notifications.
//!
//! # Usage
//!
//! ```rust
//! use quill::shared::error::{FieldError, SharedError};
//!
//! let field = FieldError::body("title", "Title must be between 1 and 100 characters");
//! let error = SharedError::validation(vec![field]);
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single per-field validation message
///
/// Mirrors the `{msg, param, location}` triple the API puts in the
/// `errors` array of a failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Human-readable message
    pub msg: String,
    /// Name of the offending field
    pub param: String,
    /// Where the field was read from (`body`, `query`, `params`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl FieldError {
    /// Field error for a request body field
    pub fn body(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: param.into(),
            location: Some("body".to_string()),
        }
    }

    /// Field error for a query-string parameter
    pub fn query(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: param.into(),
            location: Some("query".to_string()),
        }
    }
}

/// Shared error types that can occur in both client and server
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// One or more fields failed validation
    #[error("Validation failed: {}", join_messages(.errors))]
    ValidationError {
        /// Per-field messages, in the order they were found
        errors: Vec<FieldError>,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::ValidationError { errors }
    }

    /// Per-field messages, empty for non-validation errors
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::ValidationError { errors } => errors,
            Self::SerializationError { .. } => &[],
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

/// Join field messages with `"; "`, the format notifications use.
pub fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.msg.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

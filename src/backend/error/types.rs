/**
 * API Error Types
 *
 * Every handler returns `Result<_, ApiError>`. Each variant maps to one
 * HTTP status and renders the standard failure envelope (see
 * `conversion.rs`).
 *
 * # Status Mapping
 *
 * - `ValidationFailed` - 400 with per-field messages
 * - `BadRequest` - 400
 * - `Unauthorized` - 401
 * - `Forbidden` - 403
 * - `NotFound` - 404
 * - `Conflict` - 409
 * - `PayloadTooLarge` - 413
 * - `ServiceUnavailable` - 503 (optional collaborator not configured)
 * - `ServerFault` - 500, detail only shown in development mode
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::uploads::media::MediaError;
use crate::shared::error::{FieldError, SharedError};

/// Message shown in place of a fault's detail outside development mode
pub const REDACTED_FAULT_MESSAGE: &str = "Internal server error";

/// Errors returned by API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more request fields failed validation
    #[error("Validation failed")]
    ValidationFailed(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    /// Missing, malformed or expired credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not the owner and not an admin
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation or a resource still in use
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    /// Unexpected failure inside the server
    ///
    /// `context` is a short description of what was being attempted,
    /// `detail` is the underlying error text.
    #[error("{context}: {detail}")]
    ServerFault {
        context: String,
        detail: String,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create a server fault
    ///
    /// # Arguments
    ///
    /// * `context` - What the handler was doing, e.g. "Error creating post"
    /// * `detail` - The underlying error
    pub fn fault(context: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::ServerFault {
            context: context.into(),
            detail: detail.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationFailed(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ServerFault { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show any client
    ///
    /// Faults are reduced to a fixed string; their detail is attached to
    /// the response separately and only revealed in development mode.
    pub fn public_message(&self) -> String {
        match self {
            Self::ServerFault { .. } => REDACTED_FAULT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Per-field messages, empty unless this is a validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::ValidationFailed(errors) => errors,
            _ => &[],
        }
    }
}

impl From<SharedError> for ApiError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::ValidationError { errors } => Self::ValidationFailed(errors),
            SharedError::SerializationError { message } => Self::BadRequest(message),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        let unique_violation = err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());
        if unique_violation {
            return Self::Conflict("Resource already exists".to_string());
        }
        Self::fault("Database error", err)
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::fault("Password hashing failed", err)
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::fault("Token generation failed", err)
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        Self::fault("Upload failed", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(ApiError::ValidationFailed(vec![]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::PayloadTooLarge("x".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::fault("ctx", "boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_fault_message_is_redacted() {
        let error = ApiError::fault("Error creating post", "disk I/O error");
        assert_eq!(error.public_message(), REDACTED_FAULT_MESSAGE);
        assert_eq!(error.to_string(), "Error creating post: disk I/O error");
    }

    #[test]
    fn test_from_shared_validation_error() {
        let shared = SharedError::validation(vec![FieldError::body("title", "Title is required")]);
        let error: ApiError = shared.into();
        match error {
            ApiError::ValidationFailed(errors) => assert_eq!(errors[0].param, "title"),
            _ => panic!("Expected ValidationFailed"),
        }
    }

    #[test]
    fn test_row_not_found_is_a_fault() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, ApiError::ServerFault { .. }));
    }
}

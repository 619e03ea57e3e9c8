//! Client error types
//!
//! Every failed API call, cache read or mutation step ends up as a
//! `ClientError`. `notification_message` turns one into the text shown to
//! the user.

use thiserror::Error;

use crate::client::mutation::MutationPhase;
use crate::shared::error::{join_messages, FieldError};

/// Errors surfaced by the client library
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// 401; the session has been cleared
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// 400 with per-field messages
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// Any other 4xx
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 5xx
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    /// The response did not match the envelope
    #[error("could not parse response: {0}")]
    Parse(String),

    /// The call needs a session and there is none
    #[error("not signed in")]
    NotAuthenticated,

    /// A mutation step was called out of order
    #[error("cannot {operation} a mutation in phase {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: MutationPhase,
    },

    /// `fetch` on a key nobody registered a fetcher for
    #[error("no fetcher registered for {0}")]
    NoFetcher(String),
}

impl ClientError {
    /// Map a non-success HTTP status and the failure envelope's contents
    pub fn from_status(status: u16, message: Option<String>, errors: Vec<FieldError>) -> Self {
        let message = message.unwrap_or_default();
        match status {
            400 if !errors.is_empty() => Self::Validation { message, errors },
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            400..=499 => Self::Rejected { status, message },
            _ => Self::Server { status, message },
        }
    }

    /// Text for a transient notification
    ///
    /// Per-field messages joined with `"; "` when the server sent any, else
    /// the server's message, else `fallback`.
    pub fn notification_message(&self, fallback: &str) -> String {
        let server_message = match self {
            Self::Validation { message, errors } => {
                if !errors.is_empty() {
                    return join_messages(errors);
                }
                message.as_str()
            }
            Self::Unauthorized(message) | Self::Forbidden(message) | Self::NotFound(message) => {
                message.as_str()
            }
            Self::Rejected { message, .. } | Self::Server { message, .. } => message.as_str(),
            Self::NotAuthenticated => return "Please sign in to continue".to_string(),
            Self::Network(_)
            | Self::Parse(_)
            | Self::InvalidPhase { .. }
            | Self::NoFetcher(_) => "",
        };

        if server_message.trim().is_empty() {
            fallback.to_string()
        } else {
            server_message.to_string()
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_from_status() {
        assert_matches!(
            ClientError::from_status(400, Some("Validation failed".into()), vec![FieldError::body("title", "bad")]),
            ClientError::Validation { .. }
        );
        assert_matches!(
            ClientError::from_status(400, Some("Category not found".into()), vec![]),
            ClientError::Rejected { status: 400, .. }
        );
        assert_matches!(ClientError::from_status(401, None, vec![]), ClientError::Unauthorized(_));
        assert_matches!(ClientError::from_status(409, None, vec![]), ClientError::Rejected { status: 409, .. });
        assert_matches!(ClientError::from_status(503, None, vec![]), ClientError::Server { status: 503, .. });
    }

    #[test]
    fn test_notification_prefers_field_messages() {
        let error = ClientError::Validation {
            message: "Validation failed".to_string(),
            errors: vec![
                FieldError::body("content", "Comment must be between 1 and 500 characters"),
                FieldError::body("post", "Valid post ID is required"),
            ],
        };
        assert_eq!(
            error.notification_message("Failed"),
            "Comment must be between 1 and 500 characters; Valid post ID is required"
        );
    }

    #[test]
    fn test_notification_falls_back() {
        let forbidden = ClientError::Forbidden("Not authorized to delete this comment".to_string());
        assert_eq!(
            forbidden.notification_message("Failed to delete comment"),
            "Not authorized to delete this comment"
        );

        let network = ClientError::Network("connection refused".to_string());
        assert_eq!(network.notification_message("Failed to delete comment"), "Failed to delete comment");

        let empty = ClientError::Server { status: 500, message: String::new() };
        assert_eq!(empty.notification_message("Failed"), "Failed");
    }
}

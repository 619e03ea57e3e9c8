//! Response Envelope
//!
//! Every API response, success or failure, is wrapped in one fixed shape:
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "optional",
//!   "errors": [{"msg": "...", "param": "...", "location": "body"}],
//!   "data": {},
//!   "pagination": {"current": 1, "pages": 3, "total": 25, "limit": 10}
//! }
//! ```
//!
//! Unknown fields are rejected when decoding, so a server that drifts from
//! this shape surfaces as a parse error on the client instead of being
//! silently reinterpreted.

use serde::{Deserialize, Serialize};

use crate::shared::error::FieldError;

/// Fixed API response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            errors: None,
            data: Some(data),
            pagination: None,
        }
    }

    /// Successful response with a message and `data`
    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    /// Successful response that carries only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            errors: None,
            data: None,
            pagination: None,
        }
    }

    /// Failure response
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::message(message)
        }
    }

    /// Failure response with per-field messages
    pub fn failure_with_errors(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::failure(message)
        }
    }

    /// Attach pagination metadata
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Take the payload out of the envelope
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// Page metadata for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page, 1-based
    pub current: u32,
    /// Total page count, `ceil(total / limit)`
    pub pages: u32,
    /// Total number of matching records
    pub total: u64,
    /// Page size
    pub limit: u32,
}

impl Pagination {
    /// Largest page size a list endpoint accepts
    pub const MAX_LIMIT: u32 = 100;
    /// Page size used when none is requested
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Build pagination metadata for `total` records.
    ///
    /// `limit` is clamped to `1..=MAX_LIMIT` and `page` to at least 1.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.clamp(1, Self::MAX_LIMIT);
        let pages = total.div_ceil(u64::from(limit));
        Self {
            current: page.max(1),
            pages: u32::try_from(pages).unwrap_or(u32::MAX),
            total,
            limit,
        }
    }

    /// Number of records to skip for the current page
    pub fn offset(&self) -> u64 {
        u64::from(self.current.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_success_envelope_serialization_omits_absent_fields() {
        let envelope = Envelope::ok(vec![1, 2, 3]);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2, 3]}));
    }

    #[test]
    fn test_failure_envelope_carries_errors() {
        let envelope: Envelope<()> = Envelope::failure_with_errors(
            "Validation failed",
            vec![FieldError::body("title", "Title must be between 1 and 100 characters")],
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0]["param"], "title");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result =
            serde_json::from_str::<Envelope<u32>>(r#"{"success":true,"data":1,"post":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_data_decodes_as_none() {
        let envelope: Envelope<String> =
            serde_json::from_str(r#"{"success":true,"message":"Comment deleted"}"#).unwrap();
        assert_eq!(envelope.message.as_deref(), Some("Comment deleted"));
        assert_eq!(envelope.into_data(), None);
    }

    #[test]
    fn test_pagination_math() {
        assert_eq!(Pagination::new(1, 10, 0).pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).pages, 2);
        assert_eq!(Pagination::new(3, 10, 25).offset(), 20);
    }

    #[test]
    fn test_pagination_clamps_inputs() {
        let pagination = Pagination::new(0, 500, 250);
        assert_eq!(pagination.current, 1);
        assert_eq!(pagination.limit, Pagination::MAX_LIMIT);
        assert_eq!(pagination.pages, 3);

        assert_eq!(Pagination::new(1, 0, 5).limit, 1);
    }
}

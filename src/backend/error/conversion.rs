/**
 * Error Conversion
 *
 * Turns `ApiError` into an HTTP response carrying the standard failure
 * envelope:
 *
 * ```json
 * {
 *   "success": false,
 *   "message": "Validation failed",
 *   "errors": [{"msg": "Title must be between 1 and 100 characters", "param": "title", "location": "body"}]
 * }
 * ```
 *
 * Server faults render `"Internal server error"` and attach a
 * `FaultDetail` extension to the response. In development mode the
 * `reveal_fault_detail` middleware swaps the detail into the message.
 */

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::ApiError;
use crate::backend::server::state::AppState;
use crate::shared::envelope::Envelope;

/// Underlying text of a server fault, carried as a response extension
#[derive(Debug, Clone)]
pub struct FaultDetail(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.public_message();

        let envelope: Envelope<()> = match &self {
            ApiError::ValidationFailed(errors) => {
                tracing::warn!("Rejected request with {} invalid field(s)", errors.len());
                Envelope::failure_with_errors(message, errors.clone())
            }
            ApiError::ServerFault { .. } => {
                tracing::error!("Server fault: {}", self);
                Envelope::failure(message)
            }
            _ => {
                tracing::debug!("Request failed with {}: {}", status, message);
                Envelope::failure(message)
            }
        };

        let mut response = (status, Json(envelope)).into_response();
        if let ApiError::ServerFault { .. } = &self {
            response.extensions_mut().insert(FaultDetail(self.to_string()));
        }
        response
    }
}

/// Reveal fault detail in development mode
///
/// Outside development the response passes through untouched, so the
/// client only ever sees the redacted message.
pub async fn reveal_fault_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.environment.is_development() {
        return response;
    }
    match response.extensions().get::<FaultDetail>() {
        Some(FaultDetail(detail)) => {
            let envelope: Envelope<()> = Envelope::failure(detail.clone());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
        }
        None => response,
    }
}

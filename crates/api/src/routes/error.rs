//! Mapping of domain failures onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use salonbook_domain::SalonError;
use serde::Serialize;

/// Body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Copy safe to show a client.
    pub error: &'static str,
    /// Stable machine-readable error kind.
    pub code: &'static str,
}

/// [`SalonError`] rendered as a response. Only the user-facing copy leaves the
/// process; the detailed message stays in the logs.
#[derive(Debug)]
pub struct ApiError(pub SalonError);

impl ApiError {
    /// HTTP status the error is reported with.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SalonError::Validation(_) => StatusCode::BAD_REQUEST,
            SalonError::NotFound(_) => StatusCode::NOT_FOUND,
            SalonError::SlotNoLongerAvailable { .. } => StatusCode::CONFLICT,
            err if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SalonError> for ApiError {
    fn from(err: SalonError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, code = self.0.label(), "request failed");
        }
        let body = ErrorResponse { error: self.0.user_message(), code: self.0.label() };
        (status, Json(body)).into_response()
    }
}

/// Result type returned by route handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

//! API error handling.
//!
//! Every failure leaves the service as a JSON body `{"code", "message"}`.
//! Internal failures are logged here and reported with a generic message.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::TaskValidationError;
use crate::infrastructure::RepositoryError;

/// Message for an unknown or unparseable task id.
pub const TODO_NOT_FOUND: &str = "Todo not found";
/// Message for a path no route matches.
pub const ROUTE_NOT_FOUND: &str = "Route not found";
/// Message for any failure whose detail must not reach the client.
pub const INTERNAL_ERROR: &str = "An internal error occurred";

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiError::new(code, message))
    }

    /// Creates a 400 Bad Request response for a rejected task text.
    #[must_use]
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::bad_request("VALIDATION_ERROR", message)
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates the 404 returned for unknown task ids.
    #[must_use]
    pub fn todo_not_found() -> Self {
        Self::not_found(TODO_NOT_FOUND)
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(_) => Self::todo_not_found(),
            RepositoryError::Validation(validation) => Self::from(validation),
            // Internal errors should not expose details to clients.
            RepositoryError::DatabaseError(_) | RepositoryError::SerializationError(_) => {
                tracing::error!(%error, "Internal error");
                Self::internal_error(INTERNAL_ERROR)
            }
        }
    }
}

impl From<TaskValidationError> for ApiErrorResponse {
    fn from(error: TaskValidationError) -> Self {
        Self::validation_error(error.to_string())
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(%rejection, "Rejected request body");
        Self::bad_request("INVALID_JSON", rejection.body_text())
    }
}

// =============================================================================
// Tests
// =============================================================================

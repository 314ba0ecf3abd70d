//! Application error types with HTTP status code mapping.
//!
//! [`AppError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::VisitorId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid value for counter: is not a number",
///     "details": "counter"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Offending field for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status                    |
/// |-----------|------------|--------------------------------|
/// | 1000–1999 | Validation | 400 Bad Request / 422 Unprocessable Entity |
/// | 2000–2999 | Not Found  | 404 Not Found                  |
/// | 3000–3999 | Server     | 500 Internal Server Error      |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Visitor with the given ID was not found.
    #[error("visitor not found: {0}")]
    VisitorNotFound(VisitorId),

    /// Path segment does not name any possible record.
    #[error("no route matches {0}")]
    RouteNotFound(String),

    /// A supplied field could not be coerced to its column type.
    #[error("invalid value for {field}: {reason}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The request body lacks the required parameter envelope.
    #[error("param is missing or the value is empty: {0}")]
    ParameterMissing(&'static str),

    /// The request body could not be decoded at all.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds a [`AppError::Validation`] for `field`.
    #[must_use]
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation { .. } => 1001,
            Self::ParameterMissing(_) => 1002,
            Self::MalformedBody(_) => 1003,
            Self::VisitorNotFound(_) => 2001,
            Self::RouteNotFound(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ParameterMissing(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::VisitorNotFound(_) | Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for the not-found variants.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::VisitorNotFound(_) | Self::RouteNotFound(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else if self.is_not_found() {
            tracing::debug!(error = %self, "not found");
        }
        let details = match &self {
            Self::Validation { field, .. } | Self::ParameterMissing(field) => {
                Some((*field).to_string())
            }
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_unprocessable() {
        let err = AppError::validation("counter", "is not a number");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), 1001);
        assert_eq!(err.to_string(), "invalid value for counter: is not a number");
    }

    #[test]
    fn not_found_variants() {
        let err = AppError::VisitorNotFound(VisitorId::new(7));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.is_not_found());
        assert!(AppError::RouteNotFound("/visitors/abc".to_string()).is_not_found());
        assert!(!AppError::ParameterMissing("visitor").is_not_found());
    }

    #[test]
    fn sqlx_errors_become_persistence() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3001);
    }

    #[tokio::test]
    async fn response_carries_field_details() {
        let response = AppError::validation("counter", "is not a number").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let Ok(json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("body is not JSON");
        };
        assert_eq!(json["error"]["details"], "counter");
        assert_eq!(json["error"]["code"], 1001);
    }
}

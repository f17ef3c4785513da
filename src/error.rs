//! Service error types with HTTP status code mapping.
//!
//! [`HubError`] is the central error type. Each variant maps to a numeric
//! code, an HTTP status, and the structured JSON body every endpoint uses
//! for failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::validation::FieldErrors;
use crate::domain::{EventId, UserId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "validation failed",
///     "details": { "capacity": "Capacity must be at least 1" }
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
    /// Numeric error code (see the table on [`HubError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Field → message map, present for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<FieldErrors>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                  |
/// |-----------|---------------------|------------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request              |
/// | 2000–2099 | Not Found           | 404 Not Found                |
/// | 2100–2199 | Booking / Conflict  | 409 Conflict                 |
/// | 2200–2299 | Access              | 401 Unauthorized / 403       |
/// | 3000–3999 | Server              | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// One or more payload fields failed validation.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Malformed request outside of field validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown signup step name.
    #[error("invalid signup step: {0}")]
    InvalidSignupStep(String),

    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// User with the given ID was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The user already holds a seat at the event.
    #[error("already registered for event {0}")]
    AlreadyRegistered(EventId),

    /// The user holds no seat to cancel.
    #[error("not registered for event {0}")]
    NotRegistered(EventId),

    /// Every seat is taken.
    #[error("event {0} is full")]
    EventFull(EventId),

    /// The registration deadline (or start) has passed.
    #[error("registration for event {0} is closed")]
    RegistrationClosed(EventId),

    /// Email or username already taken.
    #[error("{0} is already registered")]
    DuplicateUser(String),

    /// No acting user on the request.
    #[error("authentication required")]
    Unauthenticated,

    /// The acting user lacks the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Document store failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HubError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::InvalidSignupStep(_) => 1003,
            Self::EventNotFound(_) => 2001,
            Self::UserNotFound(_) => 2002,
            Self::AlreadyRegistered(_) => 2101,
            Self::NotRegistered(_) => 2102,
            Self::EventFull(_) => 2103,
            Self::RegistrationClosed(_) => 2104,
            Self::DuplicateUser(_) => 2105,
            Self::Unauthenticated => 2201,
            Self::Forbidden(_) => 2202,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRequest(_) | Self::InvalidSignupStep(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::EventNotFound(_) | Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyRegistered(_)
            | Self::NotRegistered(_)
            | Self::EventFull(_)
            | Self::RegistrationClosed(_)
            | Self::DuplicateUser(_) => StatusCode::CONFLICT,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds a single-field validation error.
    #[must_use]
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.to_string());
        Self::Validation(errors)
    }
}

impl From<crate::domain::validation::ValidationReport> for HubError {
    fn from(report: crate::domain::validation::ValidationReport) -> Self {
        Self::Validation(report.errors)
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let code = self.error_code();
        let message = match &self {
            // Storage details stay in the log.
            Self::PersistenceError(_) => "a storage error occurred".to_string(),
            other => other.to_string(),
        };
        let details = match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses_line_up() {
        let cases = [
            (HubError::field("name", "Name is required"), 1001, StatusCode::BAD_REQUEST),
            (HubError::EventNotFound(EventId::new()), 2001, StatusCode::NOT_FOUND),
            (HubError::EventFull(EventId::new()), 2103, StatusCode::CONFLICT),
            (HubError::Unauthenticated, 2201, StatusCode::UNAUTHORIZED),
            (HubError::Forbidden("admin only".to_string()), 2202, StatusCode::FORBIDDEN),
            (
                HubError::PersistenceError("down".to_string()),
                3001,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, code, status) in cases {
            assert_eq!(err.error_code(), code);
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn validation_response_carries_field_details() {
        let response = HubError::field("capacity", "Capacity must be at least 1").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

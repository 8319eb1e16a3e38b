//! Error types for task operations.
//!
//! Every fallible operation in this crate returns [`Result`]. The variants
//! map one-to-one onto the HTTP status codes the server surfaces, so the
//! request boundary can translate without inspecting message text.

use http::StatusCode;
use serde_json::json;

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by task operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input failed validation. Carries the offending field for
    /// field-level error reporting.
    #[error("validation failed for `{field}`: {message}")]
    Validation {
        /// Name of the field that failed validation.
        field: String,
        /// Human-readable description of the failure.
        message: String,
    },

    /// The caller is authenticated but does not own the task.
    #[error("forbidden")]
    Forbidden,

    /// No task with the given id exists.
    #[error("task not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// Missing or invalid credentials.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// A bounded network call expired before completing.
    #[error("request timed out")]
    Timeout,

    /// Unexpected internal failure. Details are logged, never surfaced
    /// to callers.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error for a named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error for a task id.
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Create an unauthenticated error.
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated(reason.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The HTTP status code this error maps to at the request boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The JSON body the server returns for this error.
    ///
    /// Validation failures carry field-level detail; internal failures are
    /// collapsed to a generic message so nothing leaks.
    pub fn response_body(&self) -> serde_json::Value {
        match self {
            Self::Validation { field, message } => json!({
                "message": "The given data was invalid.",
                "errors": { field: [message] },
            }),
            Self::Forbidden => json!({ "error": "Forbidden" }),
            Self::NotFound { .. } => json!({ "error": "Task not found" }),
            Self::Unauthenticated(_) => json!({ "error": "Unauthenticated" }),
            Self::Timeout => json!({ "error": "Request timed out" }),
            Self::Internal(_) => json!({ "error": "Internal server error" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            Error::validation("title", "required").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(Error::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(Error::not_found("abc").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::unauthenticated("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_body_carries_field_detail() {
        let body = Error::validation("title", "The title field is required.").response_body();
        assert_eq!(
            body["errors"]["title"][0],
            "The title field is required."
        );
    }

    #[test]
    fn internal_body_does_not_leak_details() {
        let body = Error::internal("connection pool exhausted").response_body();
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }
}

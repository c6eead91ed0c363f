//! Error type returned by every service request.
//!
//! # Design
//! Every failure path of a request converges on `ApiError`. Callers read it
//! through three accessors that mirror what the error hook receives:
//! `message()`, `status()` (`-1` when no HTTP status was obtained) and
//! `response()` (the decoded error body, when there was one).

use serde_json::Value;
use thiserror::Error;

/// Status reported for failures that never produced an HTTP status.
pub const NO_STATUS: i32 = -1;

/// Fixed message for 5xx responses.
pub const SYSTEM_EXCEPTION: &str = "system exception";

/// Errors returned by `ServiceExt::request`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a 5xx status. The body is never read.
    #[error("system exception (HTTP {status})")]
    Server { status: u16 },

    /// The server answered with a non-2xx, non-5xx status.
    #[error("{message} (HTTP {status})")]
    Http {
        message: String,
        status: u16,
        response: Value,
    },

    /// The transport could not complete the round trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not valid JSON or did not match the expected type.
    #[error("deserialization failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A service extension point refused to assemble the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Human-readable message, as passed to the error hook.
    pub fn message(&self) -> String {
        match self {
            ApiError::Server { .. } => SYSTEM_EXCEPTION.to_string(),
            ApiError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of the failed call, or `NO_STATUS`.
    pub fn status(&self) -> i32 {
        match self {
            ApiError::Server { status } | ApiError::Http { status, .. } => i32::from(*status),
            _ => NO_STATUS,
        }
    }

    /// Decoded error body, for non-2xx non-5xx responses.
    pub fn response(&self) -> Option<&Value> {
        match self {
            ApiError::Http { response, .. } => Some(response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_error_reports_fixed_message() {
        let err = ApiError::Server { status: 503 };
        assert_eq!(err.message(), "system exception");
        assert_eq!(err.status(), 503);
        assert!(err.response().is_none());
    }

    #[test]
    fn http_error_exposes_body() {
        let err = ApiError::Http {
            message: "not found".to_string(),
            status: 404,
            response: json!({"message": "not found"}),
        };
        assert_eq!(err.message(), "not found");
        assert_eq!(err.status(), 404);
        assert_eq!(err.response(), Some(&json!({"message": "not found"})));
        assert_eq!(err.to_string(), "not found (HTTP 404)");
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.status(), NO_STATUS);
        assert_eq!(err.message(), "transport failed: connection refused");
    }
}

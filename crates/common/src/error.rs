//! Error types for the staff portal.

use axum::{
    Json,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    /// Request used a method the route does not accept.
    #[error("Method {method} Not Allowed")]
    MethodNotAllowed {
        /// Method the request used.
        method: Method,
        /// The single accepted method.
        allowed: Method,
    },

    /// Request body failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    // === Server Errors ===
    /// Notion rejected the request; holds its message.
    #[error("{0}")]
    Upstream(String),

    /// Notion could not be reached.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Request body could not be parsed.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,

            // 5xx Server Errors
            Self::Upstream(_)
            | Self::ExternalService(_)
            | Self::MalformedBody(_)
            | Self::Config(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code used in logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Upstream(_) => "UPSTREAM_REJECTED",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::MalformedBody(_) => "MALFORMED_BODY",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message sent to the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            format!("Server error: {self}")
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({ "message": self.public_message() }));
        let mut response = (status, body).into_response();

        if let Self::MethodNotAllowed { allowed, .. } = &self
            && let Ok(value) = HeaderValue::from_str(allowed.as_str())
        {
            response.headers_mut().insert(header::ALLOW, value);
        }

        response
    }
}

// === From implementations ===

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_is_prefixed() {
        let err = AppError::Upstream("bad request".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Server error: bad request");
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let response = AppError::MethodNotAllowed {
            method: Method::GET,
            allowed: Method::POST,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
    }

    #[test]
    fn test_validation_is_client_error() {
        let err = AppError::Validation("title: required".to_string());
        assert!(!err.is_server_error());
        assert_eq!(err.public_message(), "Validation error: title: required");
    }
}

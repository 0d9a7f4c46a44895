use thiserror::Error;
use std::collections::HashMap;
use serde::{Serialize, Deserialize};

// Import Axum types for HTTP response conversion
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Structured validation errors with field-level error mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationErrors {
    Single { field: String, message: String },
    Multiple { fields: HashMap<String, String> },
}

impl ValidationErrors {
    /// Human readable summary used as the response `message`.
    pub fn message(&self) -> String {
        match self {
            ValidationErrors::Single { message, .. } => message.clone(),
            ValidationErrors::Multiple { fields } => {
                let mut messages: Vec<&String> = fields.values().collect();
                messages.sort();
                messages
                    .into_iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("; ")
            }
        }
    }
}

/// The custom error type for the application.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from the sqlx library.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A migration failed to apply at startup.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A validation error with field-level details.
    #[error("Validation error: {}", .0.message())]
    Validation(ValidationErrors),

    /// A not found error. Also used for resources owned by someone else.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A forbidden error (user lacks permission).
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// A conflict error (slot taken, email in use, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An authentication error (invalid credentials or no session).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A session expired error.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// An invalid session token error.
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    /// The request ran past the server timeout.
    #[error("Request timed out")]
    Timeout,

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Shorthand for a single-field validation error.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Error::Validation(ValidationErrors::Single {
            field: field.to_string(),
            message: message.into(),
        })
    }
}

/// Unreadable or mistyped request bodies surface as a validation failure.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), reason = %rejection.body_text(), "Rejected JSON body");
        Error::validation("body", "Invalid request data")
    }
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert custom Error to HTTP response
///
/// Every failure carries `success: false` and a `message` so the frontend can
/// show it directly, plus a stable `code` for programmatic handling.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::Validation(errors) => {
                let message = errors.message();
                let fields = match errors {
                    ValidationErrors::Single { field, message } => {
                        serde_json::json!({ field: message })
                    }
                    ValidationErrors::Multiple { fields } => serde_json::json!(fields),
                };
                (
                    StatusCode::BAD_REQUEST,
                    serde_json::json!({
                        "success": false,
                        "message": message,
                        "code": "VALIDATION_ERROR",
                        "fields": fields
                    }),
                )
            }
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, failure(&msg, "NOT_FOUND")),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, failure(&msg, "FORBIDDEN")),
            Error::Conflict(msg) => (StatusCode::CONFLICT, failure(&msg, "CONFLICT")),
            Error::Authentication(msg) => (
                StatusCode::UNAUTHORIZED,
                failure(&msg, "AUTHENTICATION_FAILED"),
            ),
            Error::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, failure(&msg, "INVALID_TOKEN")),
            Error::SessionExpired(msg) => {
                (StatusCode::UNAUTHORIZED, failure(&msg, "SESSION_EXPIRED"))
            }
            Error::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                failure("Request timed out", "TIMEOUT"),
            ),
            Error::Sqlx(e) => {
                tracing::error!(error = %e, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    failure("Database error", "INTERNAL_ERROR"),
                )
            }
            Error::Migrate(e) => {
                tracing::error!(error = %e, "Migration error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    failure("Database error", "INTERNAL_ERROR"),
                )
            }
            Error::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, failure(&msg, "INTERNAL_ERROR"))
            }
            Error::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                failure("Configuration error", "CONFIG_ERROR"),
            ),
        };

        (status, Json(body)).into_response()
    }
}

fn failure(message: &str, code: &str) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "message": message,
        "code": code
    })
}

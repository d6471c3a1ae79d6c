use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::response::ActionResult;

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes surfaced to callers in the failure envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    Forbidden,
    Unauthorized,
    Conflict,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", code)
    }
}

/// One field-level validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Dotted path to the offending field, e.g. `items.0.quantity`
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Input failed validation; `issues` carries field-level detail
    #[error("{message}")]
    Validation {
        message: String,
        issues: Vec<FieldIssue>,
    },

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Caller does not own the resource
    #[error("{0}")]
    Forbidden(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Unique constraint or state conflict
    #[error("{0}")]
    Conflict(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation {
            message: msg.into(),
            issues: Vec::new(),
        }
    }

    /// Validation failure built from collected field issues
    pub fn invalid_fields(issues: Vec<FieldIssue>) -> Self {
        AppError::Validation {
            message: "Validation failed".to_string(),
            issues,
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } | AppError::Json(_) => ErrorCode::ValidationError,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Database(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                ErrorCode::InternalError
            }
        }
    }

    /// Field issues, if this is a validation failure
    pub fn issues(&self) -> Option<&[FieldIssue]> {
        match self {
            AppError::Validation { issues, .. } if !issues.is_empty() => Some(issues),
            _ => None,
        }
    }

    /// Message safe to show to callers. Unexpected failures are never echoed.
    pub fn public_message(&self) -> String {
        match self.code() {
            ErrorCode::InternalError => "An unexpected error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        if self.code() == ErrorCode::InternalError {
            tracing::error!(error = %self, "Unexpected error");
        }

        HttpResponse::build(self.status_code()).json(ActionResult::<()>::failure(self))
    }

    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unique error codes for client identification
#[derive(Debug, Clone, Copy)]
pub enum ErrorCode {
    // Database errors (1xxx)
    DatabaseQuery = 1002,

    // Validation errors (2xxx)
    ValidationFailed = 2001,
    MissingField = 2004,

    // External service errors (5xxx)
    FetchFailed = 5001,
    SummarizeFailed = 5002,
    EmailDelivery = 5003,
    EmailNotConfigured = 5004,

    // Internal errors (9xxx)
    InternalError = 9001,
    ConfigurationError = 9002,
}

impl ErrorCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// Application error type covering the three failure classes of the
/// workflow: transport/parse failures against external services,
/// validation problems, and persistence errors. None of these are
/// retried; they surface directly to the triggering request.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] sea_orm::DbErr),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Literature search or feed retrieval did not complete, or the
    /// response document could not be parsed.
    #[error("Failed to fetch papers: {0}")]
    FetchFailed(String),

    /// The chat model call failed or returned output that does not
    /// match the required summary shape.
    #[error("Failed to summarize paper: {0}")]
    SummarizeFailed(String),

    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),

    #[error("Email delivery is not configured (set APP_SMTP__HOST)")]
    EmailNotConfigured,

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::DatabaseQueryError(_) => ErrorCode::DatabaseQuery,
            Self::ValidationError(_) => ErrorCode::ValidationFailed,
            Self::MissingField(_) => ErrorCode::MissingField,
            Self::FetchFailed(_) => ErrorCode::FetchFailed,
            Self::SummarizeFailed(_) => ErrorCode::SummarizeFailed,
            Self::EmailDelivery(_) => ErrorCode::EmailDelivery,
            Self::EmailNotConfigured => ErrorCode::EmailNotConfigured,
            Self::InternalError(_) => ErrorCode::InternalError,
            Self::ConfigError(_) => ErrorCode::ConfigurationError,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseQueryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::FetchFailed(_) => StatusCode::BAD_GATEWAY,
            Self::SummarizeFailed(_) => StatusCode::BAD_GATEWAY,
            Self::EmailDelivery(_) => StatusCode::BAD_GATEWAY,
            Self::EmailNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        // Log based on severity
        match &self {
            AppError::ValidationError(_) | AppError::MissingField(_) => {
                tracing::debug!(error_code = error_code.as_u16(), %message, "Client error");
            }
            AppError::FetchFailed(_)
            | AppError::SummarizeFailed(_)
            | AppError::EmailDelivery(_)
            | AppError::EmailNotConfigured => {
                tracing::warn!(error_code = error_code.as_u16(), %message, "Upstream error");
            }
            _ => {
                tracing::error!(error_code = error_code.as_u16(), %message, error = ?self, "Server error");
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code.as_u16(),
                "status": status.as_u16(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

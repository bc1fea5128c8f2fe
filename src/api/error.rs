//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.
//!
//! Ledger and aggregation failures answer with a fixed message per route;
//! the underlying cause only goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::dto::ErrorResponse;
use crate::ledger::LedgerError;
use crate::records::AggregateError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// The ledger refused a submission
    #[error("{0}")]
    Rejected(String),

    /// Ledger read failed
    #[error("{message}")]
    Ledger {
        message: String,
        #[source]
        source: LedgerError,
    },

    /// Record aggregation failed
    #[error("{message}")]
    Aggregate {
        message: String,
        #[source]
        source: AggregateError,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Map a ledger error, answering upstream failures with `message`
    pub fn ledger(message: impl Into<String>, err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidAddress(m) => ApiError::Validation(format!("Invalid address: {m}")),
            LedgerError::SubmissionRejected(m) => ApiError::Rejected(m),
            source => ApiError::Ledger {
                message: message.into(),
                source,
            },
        }
    }

    /// Map an aggregation error, answering with `message`
    pub fn aggregate(message: impl Into<String>, source: AggregateError) -> Self {
        ApiError::Aggregate {
            message: message.into(),
            source,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Rejected(_) => (StatusCode::UNPROCESSABLE_ENTITY, "SUBMISSION_REJECTED"),
            ApiError::Ledger { source, .. } => match source {
                LedgerError::NotConfigured(_) => (StatusCode::INTERNAL_SERVER_ERROR, "NOT_CONFIGURED"),
                LedgerError::Decode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DECODE_ERROR"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_UNAVAILABLE"),
            },
            ApiError::Aggregate { source, .. } => match source {
                AggregateError::Count(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_UNAVAILABLE"),
                AggregateError::PartialFetchFailure { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "PARTIAL_FETCH_FAILURE")
                }
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        // Log the error with its cause; the body only carries the message
        let cause = match &self {
            ApiError::Ledger { source, .. } => Some(source.to_string()),
            ApiError::Aggregate { source, .. } => Some(source.to_string()),
            _ => None,
        };
        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                cause = cause.as_deref().unwrap_or(""),
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API request rejected"
            );
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(i64),

    #[error("Wallet {0} is currently locked by another transaction")]
    WalletLocked(i64),

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("Balance limit exceeded: wallet {wallet_id} would exceed {limit}")]
    BalanceLimitExceeded { wallet_id: i64, limit: i64 },

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Whether a caller-side retry can succeed without changing the request.
    /// Only lock contention qualifies; retry is never performed internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::WalletLocked(_))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::InsufficientBalance { required, available } => (
                StatusCode::BAD_REQUEST,
                "insufficient_balance",
                Some(format!("required {}, available {}", required, available)),
            ),

            // 404 Not Found
            AppError::WalletNotFound(id) => {
                (StatusCode::NOT_FOUND, "wallet_not_found", Some(id.to_string()))
            }

            // 409 Conflict - the caller may retry later
            AppError::WalletLocked(id) => {
                (StatusCode::CONFLICT, "wallet_locked", Some(id.to_string()))
            }

            // 422 Unprocessable Entity
            AppError::BalanceLimitExceeded { wallet_id, limit } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "balance_limit_exceeded",
                Some(format!("wallet {} limit {}", wallet_id, limit)),
            ),

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

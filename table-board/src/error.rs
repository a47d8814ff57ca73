//! Unified Error Handling
//!
//! Application-level error type rendered as an [`ApiResponse`]

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::ApiResponse;
use table_engine::EngineError;
use tracing::error;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The order service rejected or failed a staff action
    #[error("Order service error: {0}")]
    Upstream(String),

    /// The reconciliation engine is not running
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status and `E....` code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "E0003"),
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "E5001"),
            AppError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "E9003"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "E9001"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ApiResponse::<()>::error(code, message));
        (status, body).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::UnknownTable(id) => AppError::not_found(format!("Table {} not found", id)),
            EngineError::PrintFailed { .. } | EngineError::ConfirmFailed { .. } => {
                AppError::Upstream(e.to_string())
            }
            EngineError::Stopped => AppError::Unavailable(e.to_string()),
            EngineError::InvalidConfig(msg) => AppError::internal(msg),
        }
    }
}

/// Result type for handlers
pub type AppResult<T> = Result<T, AppError>;

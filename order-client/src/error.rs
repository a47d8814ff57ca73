//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint absent on this order service
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Non-success status from the order service
    #[error("Order service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Base URL cannot be used to build endpoints
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure injected or raised by an in-process service
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl ClientError {
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

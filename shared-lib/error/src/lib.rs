//! Common error types for the gateway and its upstream services.
//!
//! `RpcError` describes how a single upstream call failed, `GatewayError`
//! is what the HTTP request pipeline can end with, and `ErrorResponse` is
//! the only body ever returned to HTTP clients on failure.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body text for unmatched routes.
pub const NOT_FOUND_MESSAGE: &str = "Not Found";

/// Body text for every upstream or serialization failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Upstream call errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("upstream returned {code:?}: {message}")]
    Status { code: tonic::Code, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream call exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("upstream completed without a response")]
    EmptyResponse,

    #[error("upstream call was dropped before completing")]
    Dropped,
}

impl RpcError {
    /// Create a status error from a code and message.
    pub fn status(code: tonic::Code, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }
}

impl From<tonic::Status> for RpcError {
    fn from(status: tonic::Status) -> Self {
        Self::Status {
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}

impl From<tonic::transport::Error> for RpcError {
    fn from(err: tonic::transport::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Errors a gateway request can end with.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    #[error("upstream call failed: {0}")]
    Upstream(#[from] RpcError),

    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether this error is the caller's fault (unknown route) rather than ours.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RouteNotFound { .. })
    }
}

/// Error response for HTTP clients.
///
/// Upstream detail is never copied in here; it only goes to the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// `{"error": "Not Found"}`
    pub fn not_found() -> Self {
        Self::new(NOT_FOUND_MESSAGE)
    }

    /// `{"error": "Internal Server Error"}`
    pub fn internal() -> Self {
        Self::new(INTERNAL_ERROR_MESSAGE)
    }
}

impl From<&GatewayError> for ErrorResponse {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::RouteNotFound { .. } => Self::not_found(),
            GatewayError::Upstream(_) | GatewayError::Serialization(_) => Self::internal(),
        }
    }
}

/// Result type alias using GatewayError.
pub type Result<T> = std::result::Result<T, GatewayError>;

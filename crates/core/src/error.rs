//! Error types for the Shopbot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The top-level error type for all Shopbot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Remote service errors (store + benchmark harness) ---
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// How a failure should be classified when it crosses the tool boundary.
///
/// The agent only ever sees `{"error": message}`, but the kind is kept on the
/// Rust side so logs and the search solver can tell a rejected request from a
/// broken connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The service understood the request and refused it (unknown SKU,
    /// empty basket, quantity too large, ...).
    Domain,
    /// Arguments were rejected before anything was sent.
    InvalidArguments,
    /// Anything else: network, decoding, unexpected responses.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Domain => "domain",
            Self::InvalidArguments => "invalid_arguments",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors from the remote basket service or the benchmark harness.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// The service answered with an error status and a human-readable detail.
    #[error("{detail}")]
    Api { status_code: u16, detail: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("{0}")]
    Unexpected(String),
}

impl ServiceError {
    /// Shorthand for a domain-level rejection.
    pub fn api(status_code: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Api { .. } => ErrorKind::Domain,
            Self::Network(_) | Self::Decode(_) | Self::Unexpected(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::NotFound(_) | Self::ExecutionFailed { .. } => ErrorKind::Internal,
        }
    }
}

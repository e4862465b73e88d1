//! Error types for the JobsGlobal client.

use thiserror::Error;

/// Result type for JobsGlobal client operations.
pub type Result<T> = std::result::Result<T, JobsGlobalError>;

/// JobsGlobal client errors.
#[derive(Debug, Error)]
pub enum JobsGlobalError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API error (non-2xx response)
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Parse error (response body was not a valid advertisement payload)
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

//! Common error types for Mood Meals

use thiserror::Error;

/// Common result type for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Failure classes for upstream recipe fetches.
///
/// Cancellation is deliberately absent: a superseded fetch is not an error
/// and resolves to a silent no-op (see `Fetched` in moodmeals-discovery).
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// No response received (connection refused, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream responded with a non-success status
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Request could not be constructed or sent (bad base URL, bad params)
    #[error("Request error: {0}")]
    Request(String),

    /// Response body did not decode to the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

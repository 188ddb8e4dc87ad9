//! Error types for tidepool

use thiserror::Error;

/// Core error type for pool and connector operations
#[derive(Error, Debug)]
pub enum TidepoolError {
    /// The connector failed to establish a connection.
    ///
    /// Surfaced to the acquire caller as-is; the pool never retries it.
    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Pool is closed")]
    PoolClosed,

    /// A pooled connection failed its checkout check.
    ///
    /// Absorbed by the pool, which discards the connection and tries again.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl TidepoolError {
    /// Whether this error came from the connector while opening a connection
    pub fn is_connect(&self) -> bool {
        matches!(self, TidepoolError::Connect(_))
    }

    /// Whether the caller gave up waiting for a free connection
    pub fn is_timeout(&self) -> bool {
        matches!(self, TidepoolError::Timeout(_))
    }

    /// Whether the pool was shut down before or during the operation
    pub fn is_pool_closed(&self) -> bool {
        matches!(self, TidepoolError::PoolClosed)
    }
}

/// Result type alias for tidepool operations
pub type Result<T> = std::result::Result<T, TidepoolError>;

//! Error types for the Sift filtering pipeline.
//!
//! Query errors carry enough context to tell a transport failure apart from
//! a protocol-level one: the detector treats all of them as negative probe
//! signals, while the dispatcher folds them into per-image outcomes.

use thiserror::Error;

/// Top-level error type for Sift operations.
#[derive(Error, Debug)]
pub enum SiftError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Vision API query errors
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file
    #[error("Config file I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors from talking to a vision API endpoint.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Transport-level failure (DNS, connection refused, TLS)
    #[error("network error: {message}")]
    Network { message: String },

    /// The endpoint answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The endpoint answered 2xx but the body had an unexpected shape
    #[error("unexpected response shape: {message}")]
    Schema { message: String },

    /// The request exceeded its deadline
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Asked to dispatch against an endpoint whose API flavor is not known.
    /// This is a caller error, not a transport failure: raised at backend
    /// construction, never absorbed into a per-image outcome.
    #[error("unsupported API type: {kind}")]
    UnsupportedApi { kind: String },
}

impl QueryError {
    /// Fold a `reqwest` failure into the taxonomy.
    ///
    /// `timeout_ms` is the deadline that was in force for the call, used
    /// when the error is a timeout.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            QueryError::Timeout { timeout_ms }
        } else if err.is_decode() {
            QueryError::Schema {
                message: err.to_string(),
            }
        } else {
            QueryError::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Convenience type alias for Sift results.
pub type Result<T> = std::result::Result<T, SiftError>;

/// Convenience type alias for query-specific results.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

//! Sub-configuration structs with defaults.

use crate::api::ApiKind;
use serde::{Deserialize, Serialize};

/// Inference endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the inference server. Known endpoint suffixes
    /// (e.g. a pasted `/api/generate` URL) are stripped before probing.
    pub base_url: String,

    /// Vision model name
    pub model: String,

    /// Pin the endpoint's API flavor instead of probing for it.
    /// Unset means auto-detect once per session.
    pub api_type: Option<ApiKind>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2-vision".to_string(),
            api_type: None,
        }
    }
}

/// Per-request query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Sampling temperature
    pub temperature: f32,

    /// Timeout for a detection probe in milliseconds
    pub probe_timeout_ms: u64,

    /// Timeout for an image query in milliseconds.
    /// Vision models running locally can be slow.
    pub request_timeout_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            probe_timeout_ms: 5000,
            request_timeout_ms: 90_000,
        }
    }
}

/// Worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Worker count recorded in the settings file. Processing is one
    /// request at a time; the knob is kept for the settings record and
    /// bounded so a future concurrent runner inherits a sane value.
    pub max_workers: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { max_workers: 4 }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

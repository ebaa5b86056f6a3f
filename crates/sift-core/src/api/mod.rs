//! Vision API integration.
//!
//! Provides endpoint classification (Ollama vs. OpenAI-compatible), a
//! backend abstraction with one implementation per API flavor, and the
//! dispatch boundary that folds transport failures into per-image outcomes.

pub(crate) mod backend;
pub(crate) mod detect;
pub(crate) mod ollama;
pub(crate) mod openai;
#[cfg(test)]
pub(crate) mod testutil;

pub use backend::{
    ask_about_image, backend_for, BackendOptions, ImageInput, QueryOutcome, VisionAnswer,
    VisionBackend, VisionQuery,
};
pub use detect::{detect_api_type, normalize_base_url, resolve_api_kind};

use serde::{Deserialize, Serialize};

/// The detector's verdict on which API flavor a base URL implements.
///
/// Derived once per base URL and treated as immutable for the session;
/// callers cache it, the detector itself does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    /// Native Ollama API (`/api/tags`, `/api/generate`)
    Ollama,
    /// Anything implementing `/v1/models` and `/v1/chat/completions`
    #[serde(rename = "openai-compatible")]
    OpenAiCompatible,
    /// Neither probe succeeded
    Unknown,
}

impl std::fmt::Display for ApiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiKind::Ollama => write!(f, "ollama"),
            ApiKind::OpenAiCompatible => write!(f, "openai-compatible"),
            ApiKind::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for ApiKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ollama" => Ok(ApiKind::Ollama),
            "openai-compatible" | "openai" => Ok(ApiKind::OpenAiCompatible),
            "unknown" => Ok(ApiKind::Unknown),
            other => Err(format!("unknown API type: {other}")),
        }
    }
}

//! Vision backend trait, request/response types, and the dispatch boundary.
//!
//! A backend knows how to phrase an image question for one API flavor and
//! how to read that flavor's answer. `backend_for` is the factory keyed on
//! the detector's classification; `ask_about_image` is the boundary that
//! converts every transport failure into a per-image outcome.

use super::ApiKind;
use crate::error::{QueryError, QueryResult};
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to a vision API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and a format identifier
    /// (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A single image question for a vision model.
#[derive(Debug, Clone)]
pub struct VisionQuery {
    /// The image under judgment
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl VisionQuery {
    /// Build the filter question for a user-supplied object phrase.
    ///
    /// The model is constrained to a YES/NO answer so the caller can
    /// interpret it without parsing free-form prose.
    pub fn contains_object(image: ImageInput, object: &str, temperature: f32) -> Self {
        Self {
            image,
            prompt: format!(
                "Analyze the provided image carefully. Does this image contain a {object}? \
                 Please answer with only 'YES' or 'NO'."
            ),
            temperature,
        }
    }
}

/// The response from a vision model call.
#[derive(Debug, Clone)]
pub struct VisionAnswer {
    /// Raw model text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all vision backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn VisionBackend>` for dispatch on the detected flavor).
#[async_trait]
pub trait VisionBackend: Send + Sync + std::fmt::Debug {
    /// Backend name for logging (e.g., "ollama", "openai-compatible").
    fn name(&self) -> &str;

    /// Full URL the backend POSTs image queries to.
    fn query_url(&self) -> String;

    /// Send one image question and return the model's answer.
    async fn ask(&self, query: &VisionQuery) -> QueryResult<VisionAnswer>;

    /// List the models the endpoint serves.
    async fn list_models(&self) -> QueryResult<Vec<String>>;

    /// Per-request timeout for this backend.
    fn timeout(&self) -> Duration;
}

/// Knobs shared by all backend constructors.
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// Per-query timeout. Vision models running locally can be slow.
    pub request_timeout: Duration,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(90),
        }
    }
}

/// Create the backend matching a classification.
///
/// `ApiKind::Unknown` is refused outright: dispatching against an
/// unclassified endpoint would mean guessing a wire format.
pub fn backend_for(
    kind: ApiKind,
    base_url: &str,
    model: &str,
    options: BackendOptions,
) -> QueryResult<Box<dyn VisionBackend>> {
    match kind {
        ApiKind::Ollama => Ok(Box::new(super::ollama::OllamaBackend::new(
            base_url, model, options,
        ))),
        ApiKind::OpenAiCompatible => Ok(Box::new(super::openai::OpenAiBackend::new(
            base_url, model, options,
        ))),
        ApiKind::Unknown => Err(QueryError::UnsupportedApi {
            kind: kind.to_string(),
        }),
    }
}

/// Dispatcher-level result for one image, consumed and discarded by the caller.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// Whether the model produced an answer
    pub success: bool,
    /// Raw model text (empty on failure)
    pub text: String,
    /// Human-readable failure description
    pub error: Option<String>,
}

/// Ask a backend about one image, absorbing every failure.
///
/// Network errors, non-2xx statuses, timeouts, and malformed bodies all
/// resolve to a failed outcome with message text; nothing propagates past
/// this boundary.
pub async fn ask_about_image(backend: &dyn VisionBackend, query: &VisionQuery) -> QueryOutcome {
    match backend.ask(query).await {
        Ok(answer) => {
            tracing::debug!(
                backend = backend.name(),
                latency_ms = answer.latency_ms,
                "query answered"
            );
            QueryOutcome {
                success: true,
                text: answer.text,
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(backend = backend.name(), "query failed: {e}");
            QueryOutcome {
                success: false,
                text: String::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

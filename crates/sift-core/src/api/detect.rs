//! API flavor detection.
//!
//! Classifies a base URL by probing the listing endpoint of each known
//! flavor, native first. Probe failures of any kind are negative signals,
//! never errors; the worst verdict is `Unknown`.

use super::{ollama, openai, ApiKind};
use std::time::Duration;

/// Endpoint suffixes users tend to paste along with the host.
const KNOWN_SUFFIXES: &[&str] = &[
    "/api/generate",
    "/api/tags",
    "/v1/chat/completions",
    "/v1/models",
];

/// Reduce a configured URL to the bare host root.
///
/// Strips trailing slashes and any trailing known endpoint suffix, so
/// probing `http://h` and `http://h/api/generate` classify identically.
pub fn normalize_base_url(url: &str) -> String {
    let mut base = url.trim().trim_end_matches('/');
    loop {
        let mut stripped = false;
        for suffix in KNOWN_SUFFIXES {
            if let Some(rest) = base.strip_suffix(suffix) {
                base = rest;
                stripped = true;
            }
        }
        base = base.trim_end_matches('/');
        if !stripped {
            break;
        }
    }
    base.to_string()
}

/// Probe a base URL and classify its API flavor.
///
/// At most two network calls, no retries, no caching. Callers hold on to
/// the verdict for the session.
pub async fn detect_api_type(
    client: &reqwest::Client,
    base_url: &str,
    probe_timeout: Duration,
) -> ApiKind {
    let base = normalize_base_url(base_url);

    match ollama::fetch_installed_models(client, &base, probe_timeout).await {
        Ok(models) => {
            tracing::debug!("native probe succeeded, {} models installed", models.len());
            return ApiKind::Ollama;
        }
        Err(e) => tracing::debug!("native probe ruled out: {e}"),
    }

    match openai::fetch_model_ids(client, &base, probe_timeout).await {
        Ok(models) => {
            tracing::debug!(
                "openai-compatible probe succeeded, {} models served",
                models.len()
            );
            return ApiKind::OpenAiCompatible;
        }
        Err(e) => tracing::debug!("openai-compatible probe ruled out: {e}"),
    }

    ApiKind::Unknown
}

/// Resolve the session classification: an explicit pin wins, otherwise
/// probe once.
pub async fn resolve_api_kind(
    client: &reqwest::Client,
    pinned: Option<ApiKind>,
    base_url: &str,
    probe_timeout: Duration,
) -> ApiKind {
    match pinned {
        Some(kind) => {
            tracing::debug!("API type pinned to {kind}, skipping probe");
            kind
        }
        None => detect_api_type(client, base_url, probe_timeout).await,
    }
}

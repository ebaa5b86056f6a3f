//! Ollama backend for local vision model inference.
//!
//! Talks to a local Ollama instance via its native HTTP API.
//! No authentication required — just needs Ollama running locally.

use super::backend::{BackendOptions, VisionAnswer, VisionBackend, VisionQuery};
use super::detect::normalize_base_url;
use crate::error::{QueryError, QueryResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Backend for the native Ollama API.
#[derive(Debug)]
pub struct OllamaBackend {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl OllamaBackend {
    pub fn new(base_url: &str, model: &str, options: BackendOptions) -> Self {
        Self {
            endpoint: normalize_base_url(base_url),
            model: model.to_string(),
            client: reqwest::Client::new(),
            request_timeout: options.request_timeout,
        }
    }
}

/// Ollama /api/generate request body.
#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    images: Vec<String>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Ollama /api/generate response.
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama /api/tags response.
#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TagsModel>,
}

#[derive(Deserialize)]
struct TagsModel {
    name: String,
}

/// GET `{base_url}/api/tags` and return the installed model names.
///
/// Shared by the backend's `list_models` and the API type detector. A
/// body that doesn't carry the expected models array is a `Schema` error.
pub(crate) async fn fetch_installed_models(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> QueryResult<Vec<String>> {
    let url = format!("{base_url}/api/tags");
    let resp = client
        .get(&url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| QueryError::from_reqwest(e, timeout.as_millis() as u64))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(QueryError::Http {
            status: status.as_u16(),
            body,
        });
    }

    let tags: TagsResponse = resp.json().await.map_err(|e| QueryError::Schema {
        message: format!("/api/tags: {e}"),
    })?;
    Ok(tags.models.into_iter().map(|m| m.name).collect())
}

#[async_trait]
impl VisionBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn query_url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }

    async fn ask(&self, query: &VisionQuery) -> QueryResult<VisionAnswer> {
        let start = Instant::now();

        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: query.prompt.clone(),
            images: vec![query.image.data.clone()],
            stream: false,
            options: GenerateOptions {
                temperature: query.temperature,
            },
        };

        let resp = self
            .client
            .post(self.query_url())
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| QueryError::from_reqwest(e, self.timeout().as_millis() as u64))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(QueryError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let generate_resp: GenerateResponse =
            resp.json().await.map_err(|e| QueryError::Schema {
                message: format!("/api/generate: {e}"),
            })?;

        let text = generate_resp.response.trim().to_string();
        if text.is_empty() {
            return Err(QueryError::Schema {
                message: "empty response field — no content generated".to_string(),
            });
        }

        Ok(VisionAnswer {
            text,
            model: self.model.clone(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn list_models(&self) -> QueryResult<Vec<String>> {
        fetch_installed_models(&self.client, &self.endpoint, self.request_timeout).await
    }

    fn timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testutil::MockServer;
    use crate::api::ImageInput;

    fn query() -> VisionQuery {
        let image = ImageInput::from_bytes(&[1, 2, 3], "jpeg");
        VisionQuery::contains_object(image, "cat", 0.0)
    }

    #[test]
    fn test_generate_request_wire_shape() {
        let body = GenerateRequest {
            model: "llava".to_string(),
            prompt: "is there a cat?".to_string(),
            images: vec!["QUJD".to_string()],
            stream: false,
            options: GenerateOptions { temperature: 0.5 },
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["model"], "llava");
        assert_eq!(value["prompt"], "is there a cat?");
        assert_eq!(value["images"][0], "QUJD");
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["temperature"], 0.5);
    }

    #[tokio::test]
    async fn test_ask_round_trip() {
        let server = MockServer::start(&[("/api/generate", 200, r#"{"response": "yes"}"#)]).await;
        let backend = OllamaBackend::new(&server.base_url, "llava", BackendOptions::default());

        let answer = backend.ask(&query()).await.unwrap();
        assert_eq!(answer.text, "yes");
        assert_eq!(answer.model, "llava");
    }

    #[tokio::test]
    async fn test_ask_http_error() {
        let server = MockServer::start(&[("/api/generate", 500, "boom")]).await;
        let backend = OllamaBackend::new(&server.base_url, "llava", BackendOptions::default());

        let err = backend.ask(&query()).await.unwrap_err();
        match err {
            QueryError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ask_malformed_body_is_schema_error() {
        let server = MockServer::start(&[("/api/generate", 200, r#"{"answer": "yes"}"#)]).await;
        let backend = OllamaBackend::new(&server.base_url, "llava", BackendOptions::default());

        let err = backend.ask(&query()).await.unwrap_err();
        assert!(matches!(err, QueryError::Schema { .. }));
    }

    #[tokio::test]
    async fn test_ask_empty_response_is_schema_error() {
        let server = MockServer::start(&[("/api/generate", 200, r#"{"response": "  "}"#)]).await;
        let backend = OllamaBackend::new(&server.base_url, "llava", BackendOptions::default());

        let err = backend.ask(&query()).await.unwrap_err();
        assert!(matches!(err, QueryError::Schema { .. }));
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start(&[(
            "/api/tags",
            200,
            r#"{"models": [{"name": "llava:7b"}, {"name": "moondream"}]}"#,
        )])
        .await;
        let backend = OllamaBackend::new(&server.base_url, "llava", BackendOptions::default());

        let models = backend.list_models().await.unwrap();
        assert_eq!(models, vec!["llava:7b", "moondream"]);
    }

    #[tokio::test]
    async fn test_pasted_generate_url_is_normalized() {
        let server = MockServer::start(&[("/api/generate", 200, r#"{"response": "no"}"#)]).await;
        let pasted = format!("{}/api/generate", server.base_url);
        let backend = OllamaBackend::new(&pasted, "llava", BackendOptions::default());

        let answer = backend.ask(&query()).await.unwrap();
        assert_eq!(answer.text, "no");
    }
}

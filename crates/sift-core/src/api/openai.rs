//! OpenAI-compatible backend using the Chat Completions schema.
//!
//! Covers any local server implementing `/v1/models` and
//! `/v1/chat/completions` (vLLM, LM Studio, llama.cpp server). The image
//! travels as a data URL inside the user message content array.

use super::backend::{BackendOptions, VisionAnswer, VisionBackend, VisionQuery};
use super::detect::normalize_base_url;
use crate::error::{QueryError, QueryResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Backend for OpenAI-compatible servers.
#[derive(Debug)]
pub struct OpenAiBackend {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl OpenAiBackend {
    pub fn new(base_url: &str, model: &str, options: BackendOptions) -> Self {
        Self {
            endpoint: normalize_base_url(base_url),
            model: model.to_string(),
            client: reqwest::Client::new(),
            request_timeout: options.request_timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// /v1/models response.
#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

/// GET `{base_url}/v1/models` and return the served model ids.
///
/// Shared by the backend's `list_models` and the API type detector. A
/// body that doesn't carry the expected data array is a `Schema` error.
pub(crate) async fn fetch_model_ids(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> QueryResult<Vec<String>> {
    let url = format!("{base_url}/v1/models");
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

    let models: ModelsResponse = resp.json().await.map_err(|e| QueryError::Schema {
        message: format!("/v1/models: {e}"),
    })?;
    Ok(models.data.into_iter().map(|m| m.id).collect())
}

#[async_trait]
impl VisionBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn query_url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint)
    }

    async fn ask(&self, query: &VisionQuery) -> QueryResult<VisionAnswer> {
        let start = Instant::now();

        let body = ChatRequest {
            model: self.model.clone(),
            temperature: query.temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: query.prompt.clone(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: query.image.data_url(),
                        },
                    },
                ],
            }],
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

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| QueryError::Schema {
            message: format!("/v1/chat/completions: {e}"),
        })?;

        let text = chat_resp
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| QueryError::Schema {
                message: "empty choices array — no content generated".to_string(),
            })?;

        Ok(VisionAnswer {
            text: text.trim().to_string(),
            model: self.model.clone(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn list_models(&self) -> QueryResult<Vec<String>> {
        fetch_model_ids(&self.client, &self.endpoint, self.request_timeout).await
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
        let image = ImageInput::from_bytes(&[1, 2, 3], "png");
        VisionQuery::contains_object(image, "dog", 0.3)
    }

    #[test]
    fn test_chat_request_wire_shape() {
        let body = ChatRequest {
            model: "llava".to_string(),
            temperature: 0.5,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: "is there a dog?".to_string(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,QUJD".to_string(),
                        },
                    },
                ],
            }],
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["model"], "llava");
        assert_eq!(value["temperature"], 0.5);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/png;base64,QUJD"
        );
    }

    #[tokio::test]
    async fn test_ask_round_trip() {
        let server = MockServer::start(&[(
            "/v1/chat/completions",
            200,
            r#"{"choices": [{"message": {"content": "YES, clearly."}}]}"#,
        )])
        .await;
        let backend = OpenAiBackend::new(&server.base_url, "llava", BackendOptions::default());

        let answer = backend.ask(&query()).await.unwrap();
        assert_eq!(answer.text, "YES, clearly.");
    }

    #[tokio::test]
    async fn test_ask_empty_choices_is_schema_error() {
        let server =
            MockServer::start(&[("/v1/chat/completions", 200, r#"{"choices": []}"#)]).await;
        let backend = OpenAiBackend::new(&server.base_url, "llava", BackendOptions::default());

        let err = backend.ask(&query()).await.unwrap_err();
        assert!(matches!(err, QueryError::Schema { .. }));
    }

    #[tokio::test]
    async fn test_ask_http_error() {
        let server = MockServer::start(&[("/v1/chat/completions", 404, "no such model")]).await;
        let backend = OpenAiBackend::new(&server.base_url, "llava", BackendOptions::default());

        let err = backend.ask(&query()).await.unwrap_err();
        assert!(matches!(err, QueryError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start(&[(
            "/v1/models",
            200,
            r#"{"data": [{"id": "llava-1.6"}, {"id": "qwen2-vl"}]}"#,
        )])
        .await;
        let backend = OpenAiBackend::new(&server.base_url, "llava", BackendOptions::default());

        let models = backend.list_models().await.unwrap();
        assert_eq!(models, vec!["llava-1.6", "qwen2-vl"]);
    }
}

//! OpenAI-compatible HTTP backend for embeddings and chat completions

use super::{ChatMessage, Embedder, GenerationParams, Generator};
use crate::config::OpenAiConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for an OpenAI-compatible API.
///
/// Implements both [`Embedder`] (`/v1/embeddings`) and [`Generator`]
/// (`/v1/chat/completions`). No retry or backoff lives here; callers that
/// need resilience wrap these calls.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    embedding_model: String,
    embedding_dimension: usize,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: normalize_base_url(&config.base_url),
            embedding_model: config.embedding_model.clone(),
            embedding_dimension: config.embedding_dimension,
        })
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn has_version_suffix(base_url: &str) -> bool {
    let Some(last_segment) = base_url.rsplit('/').next() else {
        return false;
    };
    let Some(rest) = last_segment.strip_prefix('v') else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Join a base URL and an API path, inserting `/v1` unless the base already
/// carries a version segment
fn endpoint(base_url: &str, path: &str) -> String {
    let normalized = normalize_base_url(base_url);
    if has_version_suffix(&normalized) {
        format!("{normalized}/{path}")
    } else {
        format!("{normalized}/v1/{path}")
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Read the response body on a non-success status and fold it into an error
async fn check_status(
    response: reqwest::Response,
    what: &str,
    make_err: fn(String) -> Error,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(make_err(format!("{} request failed ({}): {}", what, status, body)))
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        debug!("Embedding {} chars with {}", text.len(), self.embedding_model);

        let response = self
            .client
            .post(endpoint(&self.base_url, "embeddings"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = check_status(response, "embedding", Error::Embedding).await?;
        let parsed: EmbeddingResponse = response.json().await?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Embedding("empty embedding response".to_string()))?;

        if vector.len() != self.embedding_dimension {
            return Err(Error::Embedding(format!(
                "dimension mismatch for model '{}': expected {}, got {}",
                self.embedding_model,
                self.embedding_dimension,
                vector.len()
            )));
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.embedding_dimension
    }

    fn model_name(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl Generator for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String> {
        let request = ChatRequest {
            model: &params.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: params.temperature,
            max_tokens: params.max_output_tokens,
        };

        debug!(
            "Requesting completion from {} ({} messages)",
            params.model,
            messages.len()
        );

        let response = self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = check_status(response, "completion", Error::Generation).await?;
        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Generation("completion response had no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ChatRole;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> OpenAiConfig {
        OpenAiConfig {
            base_url: base_url.to_string(),
            embedding_dimension: 3,
            ..OpenAiConfig::default()
        }
    }

    #[test]
    fn endpoint_from_host_base_inserts_v1() {
        assert_eq!(
            endpoint("https://api.openai.com", "embeddings"),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn endpoint_from_v1_base_appends_path_once() {
        assert_eq!(
            endpoint("https://example.com/v1/", "chat/completions"),
            "https://example.com/v1/chat/completions"
        );
    }

    #[test]
    fn endpoint_keeps_custom_version_suffix() {
        assert_eq!(
            endpoint("https://open.example.cn/api/paas/v4", "embeddings"),
            "https://open.example.cn/api/paas/v4/embeddings"
        );
    }

    #[tokio::test]
    async fn embed_parses_vector_and_sends_bearer_auth() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "text-embedding-3-small"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.1, 0.2, 0.3]}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(&server.uri()), "test-key".to_string()).unwrap();
        let vector = client.embed("hello").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn embed_rejects_dimension_mismatch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.1, 0.2]}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(&server.uri()), "k".to_string()).unwrap();
        let err = client.embed("hello").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn embed_surfaces_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(&server.uri()), "k".to_string()).unwrap();
        let err = client.embed("hello").await.unwrap_err();
        match err {
            Error::Embedding(message) => assert!(message.contains("429")),
            other => panic!("expected embedding error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_sends_roles_and_parses_answer() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "be helpful"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "hello there"}}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(&server.uri()), "k".to_string()).unwrap();
        let params = GenerationParams {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_output_tokens: 100,
        };
        let messages = vec![ChatMessage::system("be helpful"), ChatMessage::user("hi")];

        let answer = client.complete(&messages, &params).await.unwrap();
        assert_eq!(answer, "hello there");
        assert_eq!(messages[0].role, ChatRole::System);
    }

    #[tokio::test]
    async fn complete_surfaces_api_errors_as_generation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&test_config(&server.uri()), "k".to_string()).unwrap();
        let params = GenerationParams {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_output_tokens: 10,
        };

        let err = client
            .complete(&[ChatMessage::user("hi")], &params)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}

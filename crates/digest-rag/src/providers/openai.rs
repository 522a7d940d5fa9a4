//! OpenAI-compatible providers for chat completion and embeddings
//!
//! A single `OpenAiClient` handles authentication, timeouts and retries; the
//! provider structs wrap it to implement the provider traits.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::{CompletionRequest, LlmProvider};

/// Output ceiling for image descriptions
const VISION_MAX_TOKENS: u32 = 1024;

/// OpenAI API client with bounded retries
pub struct OpenAiClient {
    /// HTTP client with auth headers and timeout
    client: Client,
    /// Configuration
    config: OpenAiConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if config.api_key.trim().is_empty() {
            tracing::warn!("OPENAI_API_KEY is not set, requests will be unauthenticated");
        } else {
            let auth = format!("Bearer {}", config.api_key.trim());
            let value = HeaderValue::from_str(&auth)
                .map_err(|_| Error::Config("invalid OpenAI API key".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn retry_backoff(&self, attempt: u32) -> Duration {
        let capped = attempt.min(5);
        Duration::from_millis(self.config.retry_backoff_ms * (1 << capped))
    }

    /// POST a JSON body, retrying 429 / 5xx / transport failures
    async fn post_json<B, R>(&self, path: &str, body: &B, to_error: fn(String) -> Error) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let mut attempt = 0u32;

        loop {
            let failure = match self.client.post(&url).json(body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<R>().await.map_err(|e| {
                            to_error(format!("Failed to parse {} response: {}", path, e))
                        });
                    }

                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    let error = to_error(format!("{} failed: HTTP {} - {}", path, status, text));
                    if !should_retry(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) => {
                    let retryable = is_retryable_error(&e);
                    let error = to_error(format!("{} request failed: {}", path, e));
                    if !retryable {
                        return Err(error);
                    }
                    error
                }
            };

            if attempt >= self.config.max_retries {
                return Err(failure);
            }
            attempt += 1;
            let delay = self.retry_backoff(attempt);
            tracing::warn!(
                "OpenAI request failed (attempt {}/{}), retrying in {:?}: {}",
                attempt,
                self.config.max_retries + 1,
                delay,
                failure
            );
            sleep(delay).await;
        }
    }

    /// Run a chat completion and return the first choice's content
    async fn chat(&self, request: &ChatRequest<'_>) -> Result<String> {
        let response: ChatResponse = self
            .post_json("chat/completions", request, Error::Llm)
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    /// Complete a system + user exchange
    pub async fn complete(&self, model: &str, request: &CompletionRequest) -> Result<String> {
        tracing::debug!(
            "Chat completion with {} ({} chars of user content)",
            model,
            request.user.len()
        );

        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(&request.system),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Text(&request.user),
                },
            ],
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
        };

        self.chat(&body).await
    }

    /// Describe an image through the vision input
    pub async fn describe_image(&self, model: &str, image_data_uri: &str, instruction: &str) -> Result<String> {
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: instruction },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_data_uri },
                    },
                ]),
            }],
            max_tokens: Some(VISION_MAX_TOKENS),
            temperature: None,
        };

        self.chat(&body).await
    }

    /// Embed a batch of inputs, returning vectors in input order
    pub async fn embeddings(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest { model, input: inputs };
        let mut response: EmbeddingResponse = self
            .post_json("embeddings", &body, Error::Embedding)
            .await?;

        response.data.sort_by_key(|entry| entry.index);
        if response.data.len() != inputs.len() {
            return Err(Error::embedding(format!(
                "OpenAI returned {} embeddings for {} inputs",
                response.data.len(),
                inputs.len()
            )));
        }

        Ok(response.data.into_iter().map(|entry| entry.embedding).collect())
    }

    /// Check if the API is reachable with the configured credentials
    pub async fn health_check(&self) -> Result<bool> {
        match self.client.get(self.endpoint("models")).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

/// OpenAI embedding provider
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OpenAiEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<OpenAiClient>, config: &OpenAiConfig) -> Self {
        Self {
            client,
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dimensions,
            batch_size: config.embedding_batch_size.max(1),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.client.embeddings(&self.model, &[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("OpenAI returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.client.embeddings(&self.model, batch).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// OpenAI chat-completion provider
pub struct OpenAiLlm {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiLlm {
    /// Create from an existing client
    pub fn from_client(client: Arc<OpenAiClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.client.complete(&self.model, request).await
    }

    async fn describe_image(&self, image_data_uri: &str, instruction: &str) -> Result<String> {
        self.client
            .describe_image(&self.model, image_data_uri, instruction)
            .await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Combined provider sharing one client for embeddings and chat
pub struct OpenAiProvider {
    embedder: OpenAiEmbedder,
    llm: OpenAiLlm,
}

impl OpenAiProvider {
    /// Create a new combined provider
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(config)?);
        Ok(Self {
            embedder: OpenAiEmbedder::from_client(Arc::clone(&client), config),
            llm: OpenAiLlm::from_client(client, config.chat_model.clone()),
        })
    }

    /// Split into separate providers
    pub fn split(self) -> (OpenAiEmbedder, OpenAiLlm) {
        (self.embedder, self.llm)
    }
}

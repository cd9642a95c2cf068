//! OpenAI-compatible API client for chat completions and embeddings.
//!
//! Works against api.openai.com or any compatible endpoint via a base URL
//! override (Azure, LocalAI, vLLM, ...). Requests are plain JSON with a
//! per-client timeout; no streaming.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{render_template, ChatModel, Embedder, LlmError, Summarizer};
use crate::config::{Config, Prompts};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// OpenAI-compatible HTTP client.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: String,
}

impl OpenAiClient {
    /// Create a new client.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build()
                .expect("failed to create HTTP client"),
            api_key: api_key.into(),
            model: model.into(),
            embedding_model: embedding_model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a client from configuration, taking the key from the
    /// environment. The base URL resolves config first, then environment.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let api_key =
            std::env::var(API_KEY_ENV).map_err(|_| LlmError::MissingApiKey(API_KEY_ENV))?;

        let mut client = Self::new(api_key, &config.model, &config.embedding_model);
        if let Some(url) = config
            .base_url
            .clone()
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
        {
            client = client.with_base_url(url);
        }
        Ok(client)
    }

    /// Use a custom base URL (for OpenAI-compatible APIs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, LlmError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Network(e)
                }
            })?;

        match response.status().as_u16() {
            200 => response
                .json::<R>()
                .await
                .map_err(|e| LlmError::MalformedResponse(e.to_string())),
            429 => Err(LlmError::RateLimited),
            status => {
                let detail = response.text().await.unwrap_or_default();
                Err(LlmError::Api(format!("HTTP {}: {}", status, detail)))
            }
        }
    }

    /// One-shot chat completion for a single user prompt.
    pub async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response: ChatResponse = self.post_json("chat/completions", &request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::MalformedResponse("no choices in response".to_string()))?;

        Ok(content.trim().to_string())
    }

    /// Embed a batch of texts, returned in input order.
    pub async fn embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: inputs,
        };

        let response: EmbeddingResponse = self.post_json("embeddings", &request).await?;
        if response.data.len() != inputs.len() {
            return Err(LlmError::MalformedResponse(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.chat(prompt).await
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        self.embeddings(texts).await
    }
}

/// [`Summarizer`] backed by a chat model and configurable prompt templates.
pub struct LlmSummarizer<M: ChatModel> {
    model: M,
    prompts: Prompts,
}

impl<M: ChatModel> LlmSummarizer<M> {
    pub fn new(model: M, prompts: Prompts) -> Self {
        Self { model, prompts }
    }
}

#[async_trait]
impl<M: ChatModel> Summarizer for LlmSummarizer<M> {
    async fn file_goal(&self, filename: &str, content: &str) -> Result<String, LlmError> {
        let prompt = render_template(
            &self.prompts.file_goal,
            &[("filename", filename), ("content", content)],
        );
        self.model.complete(&prompt).await
    }

    async fn file_summary(&self, filename: &str, content: &str) -> Result<String, LlmError> {
        let prompt = render_template(
            &self.prompts.file_summary,
            &[("filename", filename), ("content", content)],
        );
        self.model.complete(&prompt).await
    }

    async fn folder_summary(
        &self,
        folder_name: &str,
        child_descriptions: &str,
    ) -> Result<String, LlmError> {
        let prompt = render_template(
            &self.prompts.folder_summary,
            &[
                ("folder_name", folder_name),
                ("child_summaries", child_descriptions),
            ],
        );
        self.model.complete(&prompt).await
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
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
    embedding: Vec<f32>,
    index: usize,
}

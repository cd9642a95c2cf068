//! Language model client traits.
//!
//! The walker and the index only ever see these traits; the concrete
//! OpenAI-compatible client lives in [`openai`]. All operations are async,
//! side-effect-free from the caller's point of view, and idempotent given
//! identical input. Backpressure and timeouts are the client's concern,
//! never the walker's.

pub mod openai;

pub use openai::{LlmSummarizer, OpenAiClient};

use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;

/// Errors from model API calls.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by API")]
    RateLimited,
    #[error("API error: {0}")]
    Api(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("missing API key: set {0}")]
    MissingApiKey(&'static str),
}

/// Summarization operations the walker depends on.
///
/// The goal and summary sub-requests for one file are separate methods so
/// callers can issue them concurrently. Any error is recoverable at the
/// node that made the call.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// One-sentence purpose of a file.
    async fn file_goal(&self, filename: &str, content: &str) -> Result<String, LlmError>;

    /// Multi-sentence behavioral summary of a file.
    async fn file_summary(&self, filename: &str, content: &str) -> Result<String, LlmError>;

    /// Combined summary of a folder from its children's descriptions.
    async fn folder_summary(
        &self,
        folder_name: &str,
        child_descriptions: &str,
    ) -> Result<String, LlmError>;
}

/// Single-prompt chat completion, used by the answer chain.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Text embedding, used by the vector index.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// Run an operation with a bounded number of extra attempts.
///
/// `retries` is the number of attempts after the first; the last error is
/// returned when every attempt fails.
pub async fn with_retry<T, F, Fut>(retries: usize, op: F) -> Result<T, LlmError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut last_err = None;
    for _ in 0..=retries {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| LlmError::Api("no attempts were made".to_string())))
}

/// Substitute `{name}` placeholders in a prompt template.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

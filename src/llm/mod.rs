//! Chat model client
//!
//! Thin wrapper over an OpenAI-compatible chat-completions endpoint.
//! The [`ChatModel`] trait is the seam services depend on; the mock
//! implementation counts its calls so tests can assert the model is
//! not invoked on cache hits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::errors::AppError;

/// Token cap for short-form newsletter summaries.
const NEWS_SUMMARY_MAX_TOKENS: u32 = 150;

/// Trait for chat-completion generation.
///
/// Implementations must be Send + Sync for use across tokio tasks.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a single user-role prompt and return the raw completion,
    /// with the model directed to emit a JSON object.
    async fn complete_json(&self, prompt: &str) -> Result<String, AppError>;

    /// Send a single user-role prompt and return a plain-text
    /// completion, capped for short summaries.
    async fn complete_text(&self, prompt: &str) -> Result<String, AppError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// OpenAI-compatible HTTP chat client.
pub struct OpenAiChat {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiChat {
    pub fn new(config: LlmConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::SummarizeFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    async fn complete(
        &self,
        prompt: &str,
        response_format: Option<serde_json::Value>,
        max_tokens: Option<u32>,
    ) -> Result<String, AppError> {
        let payload = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format,
            max_tokens,
        };

        let res = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::SummarizeFailed(format!("chat request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::SummarizeFailed(format!(
                "chat API error {status}: {body}"
            )));
        }

        let body: ChatResponse = res
            .json()
            .await
            .map_err(|e| AppError::SummarizeFailed(format!("chat response parse error: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::SummarizeFailed("chat response had no choices".to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete_json(&self, prompt: &str) -> Result<String, AppError> {
        self.complete(
            prompt,
            Some(serde_json::json!({ "type": "json_object" })),
            None,
        )
        .await
    }

    async fn complete_text(&self, prompt: &str) -> Result<String, AppError> {
        self.complete(prompt, None, Some(NEWS_SUMMARY_MAX_TOKENS)).await
    }
}

/// Mock chat model for tests and keyless development.
///
/// Returns canned responses and records how many calls were made.
pub struct MockChatModel {
    json_response: String,
    text_response: String,
    calls: AtomicUsize,
}

impl Default for MockChatModel {
    fn default() -> Self {
        Self {
            json_response: serde_json::json!({
                "key_findings": "Mock key findings.",
                "methodology": "Mock methodology.",
                "implications": "Mock implications.",
            })
            .to_string(),
            text_response: "Mock summary of the news item.".to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MockChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the JSON completion, e.g. to test malformed output.
    pub fn with_json_response(response: impl Into<String>) -> Self {
        Self {
            json_response: response.into(),
            ..Self::default()
        }
    }

    /// Total number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete_json(&self, _prompt: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.json_response.clone())
    }

    async fn complete_text(&self, _prompt: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text_response.clone())
    }
}

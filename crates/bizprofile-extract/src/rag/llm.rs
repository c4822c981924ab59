//! Chat completion seam and the OpenAI-compatible client behind it.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::RetrievalError;

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one user prompt and return the raw text of the reply.
    async fn complete(&self, prompt: &str) -> Result<String, RetrievalError>;
}

/// OpenAI `/chat/completions` client, always called at temperature 0.
pub struct OpenAiChat {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl OpenAiChat {
    #[must_use]
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, prompt: &str) -> Result<String, RetrievalError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RetrievalError::Model(format!("chat request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(RetrievalError::Model(format!(
                "chat completion returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RetrievalError::Model(format!("chat response parse error: {e}")))?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RetrievalError::Model("chat response has no message content".to_string()))
    }
}

//! Embedding backends: a TEI server or the OpenAI embeddings API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// Maximum number of texts per TEI `/embed` call.
const TEI_BATCH_SIZE: usize = 64;

/// Per-input character cap for the OpenAI embeddings endpoint.
const OPENAI_MAX_INPUT_CHARS: usize = 8000;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError>;
}

/// TEI (Text Embeddings Inference) HTTP client.
pub struct TeiEmbedder {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct TeiRequest<'a> {
    inputs: &'a [String],
}

impl TeiEmbedder {
    #[must_use]
    pub fn new(tei_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/embed", tei_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Embedder for TeiEmbedder {
    /// Texts are sent in batches of 64.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(TEI_BATCH_SIZE) {
            let response = self
                .client
                .post(&self.url)
                .json(&TeiRequest { inputs: batch })
                .send()
                .await
                .map_err(|e| RetrievalError::Embedding(format!("TEI request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(RetrievalError::Embedding(format!(
                    "TEI returned status {}",
                    response.status()
                )));
            }

            let embeddings: Vec<Vec<f32>> = response.json().await.map_err(|e| {
                RetrievalError::Embedding(format!("TEI response parse error: {e}"))
            })?;

            if embeddings.len() != batch.len() {
                return Err(RetrievalError::Embedding(format!(
                    "TEI returned {} embeddings for {} inputs",
                    embeddings.len(),
                    batch.len()
                )));
            }

            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }
}

/// OpenAI `/embeddings` client.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct OpenAiEmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    #[must_use]
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = OpenAiEmbeddingRequest {
            model: &self.model,
            input: texts.iter().map(|t| truncate_chars(t, OPENAI_MAX_INPUT_CHARS)).collect(),
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RetrievalError::Embedding(format!("OpenAI embeddings request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(RetrievalError::Embedding(format!(
                "OpenAI embeddings returned status {}",
                response.status()
            )));
        }

        let mut body: OpenAiEmbeddingResponse = response.json().await.map_err(|e| {
            RetrievalError::Embedding(format!("OpenAI embeddings parse error: {e}"))
        })?;

        if body.data.len() != texts.len() {
            return Err(RetrievalError::Embedding(format!(
                "OpenAI returned {} embeddings for {} inputs",
                body.data.len(),
                texts.len()
            )));
        }
        body.data.sort_by_key(|item| item.index);
        Ok(body.data.into_iter().map(|item| item.embedding).collect())
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(byte_idx, _)| &text[..byte_idx])
}

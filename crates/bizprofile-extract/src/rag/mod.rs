//! Retrieval-augmented extraction: index a site's chunks, retrieve the most
//! relevant ones for a fixed query, and ask a chat model for the profile.

pub mod collection;
pub mod embeddings;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod vector_store;

use std::sync::Arc;

use bizprofile_core::{PartialProfile, SiteUrl};
use tracing::{debug, info, warn};

use crate::chunk::Chunk;
use crate::error::RetrievalError;

pub use collection::sanitize_collection_name;
pub use embeddings::{Embedder, OpenAiEmbedder, TeiEmbedder};
pub use llm::{ChatModel, OpenAiChat};
pub use parse::{parse_profile, strip_code_fences};
pub use prompt::{build_prompt, RETRIEVAL_QUERY};
pub use vector_store::{ChunkPoint, MemoryVectorStore, QdrantStore, ScoredChunk, VectorStore};

/// Chunks embedded and upserted per round trip.
const UPSERT_BATCH_SIZE: usize = 8;

/// Result of the retrieval path.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// The model returned a JSON object.
    Extracted(PartialProfile),
    /// The model replied with something that is not a JSON object.
    Malformed { raw: String },
    /// Embedding, storage or the model failed, or there was nothing to index.
    Unavailable,
}

impl RetrievalOutcome {
    /// Fields usable by merge; malformed and unavailable results carry none.
    #[must_use]
    pub fn profile(&self) -> Option<&PartialProfile> {
        match self {
            RetrievalOutcome::Extracted(profile) => Some(profile),
            RetrievalOutcome::Malformed { .. } | RetrievalOutcome::Unavailable => None,
        }
    }
}

pub struct RetrievalExtractor {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chat: Arc<dyn ChatModel>,
    top_k: usize,
}

impl RetrievalExtractor {
    #[must_use]
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        chat: Arc<dyn ChatModel>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            chat,
            top_k: top_k.max(1),
        }
    }

    /// Run the retrieval path for `site` over its `chunks`.
    ///
    /// Never fails: collaborator errors are logged and reported as
    /// [`RetrievalOutcome::Unavailable`].
    pub async fn extract(&self, chunks: &[Chunk], site: &SiteUrl) -> RetrievalOutcome {
        if chunks.is_empty() {
            debug!(site = %site, "no chunks to index, skipping retrieval");
            return RetrievalOutcome::Unavailable;
        }

        match self.try_extract(chunks, site).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(site = %site, error = %e, "retrieval unavailable, using fallback only");
                RetrievalOutcome::Unavailable
            }
        }
    }

    async fn try_extract(
        &self,
        chunks: &[Chunk],
        site: &SiteUrl,
    ) -> Result<RetrievalOutcome, RetrievalError> {
        let collection = sanitize_collection_name(site.as_str());
        self.index(&collection, chunks).await?;

        let query = self.embedder.embed(&[RETRIEVAL_QUERY.to_string()]).await?;
        let query_vector = query
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Embedding("no vector for retrieval query".to_string()))?;
        let hits = self.store.query(&collection, &query_vector, self.top_k).await?;

        let context = if hits.is_empty() {
            debug!(site = %site, "retrieval returned no hits, using leading chunks");
            chunks
                .iter()
                .take(self.top_k)
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            hits.iter().map(|h| h.text.as_str()).collect::<Vec<_>>().join(" ")
        };

        let prompt = build_prompt(site.as_str(), &context);
        let raw = self.chat.complete(&prompt).await?;

        match parse_profile(&raw) {
            Some(profile) => {
                info!(site = %site, hits = hits.len(), "retrieval extraction succeeded");
                Ok(RetrievalOutcome::Extracted(profile))
            }
            None => {
                warn!(site = %site, "model reply is not a JSON object");
                Ok(RetrievalOutcome::Malformed {
                    raw: strip_code_fences(&raw),
                })
            }
        }
    }

    async fn index(&self, collection: &str, chunks: &[Chunk]) -> Result<(), RetrievalError> {
        for (batch_no, batch) in chunks.chunks(UPSERT_BATCH_SIZE).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(RetrievalError::Embedding(format!(
                    "got {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }

            if batch_no == 0 {
                let dimension = vectors.first().map_or(0, Vec::len);
                self.store.ensure_collection(collection, dimension).await?;
            }

            let points = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, vector)| ChunkPoint {
                    index: chunk.index,
                    text: chunk.text.clone(),
                    source_page: chunk.source_page.to_string(),
                    vector,
                })
                .collect();
            self.store.upsert(collection, points).await?;
        }

        debug!(collection, chunks = chunks.len(), "indexed chunks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::chunk::chunk_text;

    struct ConstEmbedder;

    #[async_trait]
    impl Embedder for ConstEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    /// Accepts writes, never finds anything.
    struct EmptyStore;

    #[async_trait]
    impl VectorStore for EmptyStore {
        async fn ensure_collection(&self, _: &str, _: usize) -> Result<(), RetrievalError> {
            Ok(())
        }

        async fn upsert(&self, _: &str, _: Vec<ChunkPoint>) -> Result<(), RetrievalError> {
            Ok(())
        }

        async fn query(&self, _: &str, _: &[f32], _: usize) -> Result<Vec<ScoredChunk>, RetrievalError> {
            Ok(Vec::new())
        }
    }

    struct DownStore;

    #[async_trait]
    impl VectorStore for DownStore {
        async fn ensure_collection(&self, _: &str, _: usize) -> Result<(), RetrievalError> {
            Err(RetrievalError::VectorStore("connection refused".to_string()))
        }

        async fn upsert(&self, _: &str, _: Vec<ChunkPoint>) -> Result<(), RetrievalError> {
            Err(RetrievalError::VectorStore("connection refused".to_string()))
        }

        async fn query(&self, _: &str, _: &[f32], _: usize) -> Result<Vec<ScoredChunk>, RetrievalError> {
            Err(RetrievalError::VectorStore("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingChat {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatModel for RecordingChat {
        async fn complete(&self, prompt: &str) -> Result<String, RetrievalError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(r#"{"businessName": "Acme"}"#.to_string())
        }
    }

    fn site() -> SiteUrl {
        SiteUrl::parse("https://acme.com").unwrap()
    }

    fn chunks() -> Vec<Chunk> {
        let text = (0..40).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        chunk_text(&text, &site(), 10, 0)
    }

    #[tokio::test]
    async fn empty_hits_use_leading_chunks_as_context() {
        let chat = Arc::new(RecordingChat::default());
        let extractor = RetrievalExtractor::new(
            Arc::new(ConstEmbedder),
            Arc::new(EmptyStore),
            chat.clone(),
            2,
        );

        let outcome = extractor.extract(&chunks(), &site()).await;

        assert!(matches!(outcome, RetrievalOutcome::Extracted(ref p) if p.business_name == "Acme"));
        let prompts = chat.prompts.lock().unwrap();
        assert!(prompts[0].contains("w0 w1"));
        assert!(prompts[0].contains("w19"));
        assert!(!prompts[0].contains("w20"));
    }

    #[tokio::test]
    async fn store_failure_is_unavailable() {
        let chat = Arc::new(RecordingChat::default());
        let extractor =
            RetrievalExtractor::new(Arc::new(ConstEmbedder), Arc::new(DownStore), chat.clone(), 2);

        let outcome = extractor.extract(&chunks(), &site()).await;

        assert_eq!(outcome, RetrievalOutcome::Unavailable);
        assert!(chat.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_json_reply_is_malformed_with_raw_text() {
        struct ProseChat;

        #[async_trait]
        impl ChatModel for ProseChat {
            async fn complete(&self, _: &str) -> Result<String, RetrievalError> {
                Ok("```\nI could not find a business name.\n```".to_string())
            }
        }

        let extractor = RetrievalExtractor::new(
            Arc::new(ConstEmbedder),
            Arc::new(MemoryVectorStore::new()),
            Arc::new(ProseChat),
            2,
        );

        let outcome = extractor.extract(&chunks(), &site()).await;

        assert_eq!(
            outcome,
            RetrievalOutcome::Malformed {
                raw: "I could not find a business name.".to_string()
            }
        );
        assert!(outcome.profile().is_none());
    }

    #[tokio::test]
    async fn no_chunks_is_unavailable() {
        let extractor = RetrievalExtractor::new(
            Arc::new(ConstEmbedder),
            Arc::new(MemoryVectorStore::new()),
            Arc::new(RecordingChat::default()),
            2,
        );
        assert_eq!(extractor.extract(&[], &site()).await, RetrievalOutcome::Unavailable);
    }
}

//! Turns fetched pages into a business profile.
//!
//! Page HTML is normalized to text and chunked. Chunks feed the retrieval
//! extractor (embed, store, retrieve, prompt a chat model) while the
//! deterministic fallback extractors read the same pages independently.
//! [`merge`] reconciles both into a [`BusinessProfile`](bizprofile_core::BusinessProfile)
//! that always carries every field.

pub mod chunk;
pub mod error;
pub mod fallback;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod rag;

pub use chunk::{chunk_pages, chunk_text, Chunk};
pub use error::{PipelineError, RetrievalError};
pub use fallback::{extract_fallback, PageContent};
pub use merge::merge;
pub use normalize::{dedupe_tokens, html_to_text};
pub use pipeline::{PipelineOptions, ProfilePipeline};
pub use rag::{
    ChatModel, Embedder, MemoryVectorStore, OpenAiChat, OpenAiEmbedder, QdrantStore,
    RetrievalExtractor, RetrievalOutcome, TeiEmbedder, VectorStore,
};

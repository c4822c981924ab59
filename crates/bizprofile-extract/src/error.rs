use bizprofile_core::CoreError;
use thiserror::Error;

/// Failures of the retrieval collaborators. The retrieval extractor turns
/// every one of these into an unavailable outcome; they never reach callers
/// of the pipeline.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("vector store error: {0}")]
    VectorStore(String),

    #[error("language model error: {0}")]
    Model(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidUrl(#[from] CoreError),
}

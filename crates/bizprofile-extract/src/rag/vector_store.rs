//! Per-site chunk storage and similarity search.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::error::RetrievalError;

/// A chunk with its embedding, ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPoint {
    pub index: usize,
    pub text: String,
    pub source_page: String,
    pub vector: Vec<f32>,
}

/// A stored chunk returned by a similarity query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub index: usize,
    pub text: String,
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create `collection` for vectors of `dimension` if it does not exist.
    async fn ensure_collection(&self, collection: &str, dimension: usize) -> Result<(), RetrievalError>;

    /// Insert or overwrite points. A chunk index always maps to the same
    /// point, so re-upserting a site replaces its chunks in place.
    async fn upsert(&self, collection: &str, points: Vec<ChunkPoint>) -> Result<(), RetrievalError>;

    /// The `top_k` stored chunks most similar to `vector`, best first.
    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError>;
}

/// Qdrant HTTP client.
pub struct QdrantStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct CreateCollectionRequest {
    vectors: VectorsConfig,
}

#[derive(Serialize)]
struct VectorsConfig {
    size: usize,
    distance: String,
}

#[derive(Serialize)]
struct UpsertPointsRequest {
    points: Vec<Point>,
}

#[derive(Serialize)]
struct Point {
    id: u64,
    vector: Vec<f32>,
    payload: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    score: f32,
    #[serde(default)]
    payload: HashMap<String, Value>,
}

impl QdrantStore {
    #[must_use]
    pub fn new(qdrant_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: qdrant_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    /// Uses cosine distance.
    async fn ensure_collection(&self, collection: &str, dimension: usize) -> Result<(), RetrievalError> {
        let url = format!("{}/collections/{collection}", self.base_url);

        if let Ok(resp) = self.client.get(&url).send().await {
            if resp.status().is_success() {
                return Ok(());
            }
        }

        let body = CreateCollectionRequest {
            vectors: VectorsConfig {
                size: dimension,
                distance: "Cosine".to_string(),
            },
        };

        let resp = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                RetrievalError::VectorStore(format!("collection create request failed: {e}"))
            })?;

        if !resp.status().is_success() {
            return Err(RetrievalError::VectorStore(format!(
                "collection create returned status {}",
                resp.status()
            )));
        }

        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<ChunkPoint>) -> Result<(), RetrievalError> {
        let points = points
            .into_iter()
            .map(|p| Point {
                id: chunk_point_id(collection, p.index),
                vector: p.vector,
                payload: HashMap::from([
                    ("chunk".to_string(), json!(p.index)),
                    ("text".to_string(), json!(p.text)),
                    ("source_page".to_string(), json!(p.source_page)),
                ]),
            })
            .collect();

        let upsert_url = format!("{}/collections/{collection}/points?wait=true", self.base_url);
        let resp = self
            .client
            .put(&upsert_url)
            .json(&UpsertPointsRequest { points })
            .send()
            .await
            .map_err(|e| RetrievalError::VectorStore(format!("upsert request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(RetrievalError::VectorStore(format!(
                "upsert returned status {}",
                resp.status()
            )));
        }

        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        let search_url = format!("{}/collections/{collection}/points/search", self.base_url);
        let resp = self
            .client
            .post(&search_url)
            .json(&json!({ "vector": vector, "limit": top_k, "with_payload": true }))
            .send()
            .await
            .map_err(|e| RetrievalError::VectorStore(format!("search request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(RetrievalError::VectorStore(format!(
                "search returned status {}",
                resp.status()
            )));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| RetrievalError::VectorStore(format!("search response parse error: {e}")))?;

        Ok(body
            .result
            .into_iter()
            .filter_map(|hit| {
                let text = hit.payload.get("text").and_then(Value::as_str)?.to_string();
                let index = hit
                    .payload
                    .get("chunk")
                    .and_then(Value::as_u64)
                    .and_then(|i| usize::try_from(i).ok())?;
                Some(ScoredChunk {
                    index,
                    text,
                    score: hit.score,
                })
            })
            .collect())
    }
}

/// Derive a stable point ID from a collection and chunk index.
///
/// Takes the first 8 bytes of SHA-256(`"{collection}:{index}"`) as a
/// big-endian u64.
#[must_use]
pub fn chunk_point_id(collection: &str, index: usize) -> u64 {
    let hash = Sha256::digest(format!("{collection}:{index}").as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(bytes)
}

/// Process-local store used when no Qdrant URL is configured.
#[derive(Default)]
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, BTreeMap<usize, ChunkPoint>>>,
}

impl MemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn point_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn ensure_collection(&self, collection: &str, _dimension: usize) -> Result<(), RetrievalError> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(collection.to_string())
            .or_default();
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<ChunkPoint>) -> Result<(), RetrievalError> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let stored = collections.entry(collection.to_string()).or_default();
        for point in points {
            stored.insert(point.index, point);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        let Some(stored) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<ScoredChunk> = stored
            .values()
            .map(|p| ScoredChunk {
                index: p.index,
                text: p.text.clone(),
                score: cosine_similarity(vector, &p.vector),
            })
            .collect();
        // Stable sort keeps index order among equal scores.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(index: usize, vector: Vec<f32>) -> ChunkPoint {
        ChunkPoint {
            index,
            text: format!("chunk {index}"),
            source_page: "https://acme.com".to_string(),
            vector,
        }
    }

    #[test]
    fn point_id_is_stable_per_collection_and_index() {
        assert_eq!(chunk_point_id("collection_a", 3), chunk_point_id("collection_a", 3));
        assert_ne!(chunk_point_id("collection_a", 3), chunk_point_id("collection_a", 4));
        assert_ne!(chunk_point_id("collection_a", 3), chunk_point_id("collection_b", 3));
    }

    #[tokio::test]
    async fn memory_store_ranks_by_cosine_similarity() {
        let store = MemoryVectorStore::new();
        store.ensure_collection("c", 2).await.unwrap();
        store
            .upsert(
                "c",
                vec![
                    point(0, vec![1.0, 0.0]),
                    point(1, vec![0.0, 1.0]),
                    point(2, vec![0.7, 0.7]),
                ],
            )
            .await
            .unwrap();

        let hits = store.query("c", &[0.0, 1.0], 2).await.unwrap();
        assert_eq!(hits.iter().map(|h| h.index).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn memory_store_upsert_overwrites_same_index() {
        let store = MemoryVectorStore::new();
        store.upsert("c", vec![point(0, vec![1.0])]).await.unwrap();
        let mut replacement = point(0, vec![1.0]);
        replacement.text = "fresh".to_string();
        store.upsert("c", vec![replacement]).await.unwrap();

        assert_eq!(store.point_count("c"), 1);
        let hits = store.query("c", &[1.0], 5).await.unwrap();
        assert_eq!(hits[0].text, "fresh");
    }

    #[tokio::test]
    async fn memory_store_unknown_collection_is_empty() {
        let store = MemoryVectorStore::new();
        assert!(store.query("missing", &[1.0], 3).await.unwrap().is_empty());
    }
}

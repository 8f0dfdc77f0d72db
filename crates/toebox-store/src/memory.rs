//! In-memory store built per request.
//!
//! Brute-force cosine similarity over everything added in this request's
//! lifetime. Results are filtered to the owner partition plus any free-form
//! search parameters that match metadata fields.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use toebox_core::{DocChunk, Embedder, RunConfig, ScoredDoc, StoreError, VectorStore};

use crate::cosine_similarity;

/// In-memory vector store.
///
/// Not persisted; `persist` is a no-op. Suitable for per-request retrieval
/// over a handful of local documents and for tests.
pub struct MemoryStore {
    embedder: Arc<dyn Embedder>,
    user_id: String,
    search_kwargs: HashMap<String, serde_json::Value>,
    inner: Arc<RwLock<Vec<(DocChunk, Vec<f32>)>>>,
}

impl MemoryStore {
    /// Create an empty store scoped to the configuration's partition.
    pub fn new(embedder: Arc<dyn Embedder>, config: &RunConfig) -> Self {
        Self {
            embedder,
            user_id: config.user_id.clone(),
            search_kwargs: config.search_kwargs.clone(),
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Whether a document is visible to this store's partition and matches
    /// the configured search parameters.
    fn matches_filter(&self, doc: &DocChunk) -> bool {
        if doc.metadata.user_id != self.user_id {
            return false;
        }
        if self.search_kwargs.is_empty() {
            return true;
        }
        let metadata = match serde_json::to_value(&doc.metadata) {
            Ok(value) => value,
            Err(_) => return false,
        };
        self.search_kwargs
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn add_documents(&self, docs: &[DocChunk]) -> Result<(), StoreError> {
        if docs.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = docs.iter().map(|d| d.page_content.as_str()).collect();
        let embeddings = self
            .embedder
            .embed(&texts)
            .await
            .map_err(|e| StoreError::Insert(e.to_string()))?;

        if embeddings.len() != docs.len() {
            return Err(StoreError::Insert(format!(
                "embedder returned {} vectors for {} documents",
                embeddings.len(),
                docs.len()
            )));
        }

        let mut inner = self.inner.write().await;
        for (doc, embedding) in docs.iter().zip(embeddings) {
            inner.push((doc.clone(), embedding));
        }
        debug!("Added {} documents to memory store", docs.len());
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDoc>, StoreError> {
        let query_embedding = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let inner = self.inner.read().await;
        let mut scored: Vec<ScoredDoc> = inner
            .iter()
            .filter(|(doc, _)| self.matches_filter(doc))
            .map(|(doc, embedding)| ScoredDoc {
                doc: doc.clone(),
                score: cosine_similarity(&query_embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn persist(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn contains_hash(&self, content_hash: &str) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .iter()
            .any(|(doc, _)| doc.metadata.content_hash == content_hash))
    }

    async fn delete_by_source(&self, source: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.len();
        inner.retain(|(doc, _)| doc.metadata.source != source);
        let deleted = (before - inner.len()) as u64;
        debug!("Deleted {} documents for source {}", deleted, source);
        Ok(deleted)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.len())
    }
}

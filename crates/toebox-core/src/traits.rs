//! Trait seams for pipeline components.
//!
//! - [`Embedder`]: generate vector embeddings for documents and queries
//! - [`ChatModel`]: free-text and schema-constrained model calls
//! - [`VectorStore`]: store, search, and persist indexed documents
//! - [`Fetcher`]: retrieve remote content
//!
//! These traits keep each backend swappable without touching the rest of
//! the pipeline; production implementations live in the sibling crates.

use async_trait::async_trait;

use crate::error::{EmbedError, LlmError, SourceError, StoreError};
use crate::types::{ChatMessage, DocChunk, ScoredDoc};

// ============================================================================
// Embedding
// ============================================================================

/// Trait for generating text embeddings.
///
/// Deterministic in contract: the same text yields the same vector from a
/// given provider instance. Dimensionality is provider-defined; callers must
/// not assume a specific dimension across providers.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Embed a batch of texts.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a single query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut results = self.embed(&[text]).await?;
        results
            .pop()
            .ok_or_else(|| EmbedError::Inference("empty embedding result".to_string()))
    }
}

impl std::fmt::Debug for dyn Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("model_name", &self.model_name())
            .finish()
    }
}

// ============================================================================
// Chat Models
// ============================================================================

/// Trait for chat-model calls.
///
/// The structured variant returns a JSON value for the caller to validate
/// against its target schema; a mismatch is the caller's translation error,
/// not the model's.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Complete a conversation, returning the assistant's text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// Complete a conversation constrained to JSON output.
    async fn complete_structured(
        &self,
        messages: &[ChatMessage],
    ) -> Result<serde_json::Value, LlmError>;
}

impl std::fmt::Debug for dyn ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel")
            .field("model_name", &self.model_name())
            .finish()
    }
}

// ============================================================================
// Vector Storage
// ============================================================================

/// Trait for vector storage and similarity search.
///
/// Implementations own their embedding capability and any interior
/// synchronization; concurrent `add_documents` calls on one handle must not
/// corrupt the store, and `persist` calls for one storage location are
/// serialized by the implementation.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Add documents to the store, embedding their content.
    async fn add_documents(&self, docs: &[DocChunk]) -> Result<(), StoreError>;

    /// Search for the `k` most similar documents to the query text.
    async fn similarity_search(&self, query: &str, k: usize)
        -> Result<Vec<ScoredDoc>, StoreError>;

    /// Flush the store to its backing medium. No-op for non-persistent stores.
    async fn persist(&self) -> Result<(), StoreError>;

    /// Targeted metadata lookup: does any stored document carry this content hash?
    async fn contains_hash(&self, content_hash: &str) -> Result<bool, StoreError>;

    /// Delete all documents originating from the given source locator.
    /// Returns the number of documents removed.
    async fn delete_by_source(&self, source: &str) -> Result<u64, StoreError>;

    /// Number of stored documents.
    async fn count(&self) -> Result<usize, StoreError>;
}

// ============================================================================
// Content Fetching
// ============================================================================

/// Trait for fetching remote content.
///
/// Exists so ingestion can run against an in-memory fake in tests; the
/// production implementation is an HTTP client.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL's body as text.
    async fn fetch(&self, url: &str) -> Result<String, SourceError>;
}

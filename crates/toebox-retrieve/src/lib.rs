//! # toebox-retrieve
//!
//! Score-threshold retrieval with adaptive breadth and recency blending.
//!
//! Retrieval starts with a small candidate count and widens the search by a
//! fixed increment until enough qualifying results are found, the store is
//! exhausted, or the candidate ceiling is reached. Documents below the
//! minimum similarity score are never returned. When a recency weight is
//! configured, final ordering blends similarity with how recent each
//! document is relative to the rest of the result set.

pub mod recency;
pub mod threshold;

pub use recency::apply_recency_bias;
pub use threshold::{retrieve_with_threshold, RetrieveOptions};

use toebox_core::{ScoredDoc, StoreError, VectorStore};

/// Retrieve documents for a query: threshold search, then recency blending
/// when `recency_weight > 0`.
pub async fn retrieve(
    store: &dyn VectorStore,
    query: &str,
    options: &RetrieveOptions,
    recency_weight: f32,
) -> Result<Vec<ScoredDoc>, StoreError> {
    let docs = retrieve_with_threshold(store, query, options).await?;
    if recency_weight > 0.0 {
        Ok(apply_recency_bias(docs, recency_weight))
    } else {
        Ok(docs)
    }
}

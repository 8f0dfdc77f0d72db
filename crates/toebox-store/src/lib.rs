//! # toebox-store
//!
//! Vector-store backends for toebox.
//!
//! One [`VectorStore`](toebox_core::VectorStore) contract, three providers:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MemoryStore`] | Brute-force in-memory store, built per request |
//! | [`FileStore`] | File-persisted index with change detection |
//! | [`RemoteStore`] | Managed remote vector service over HTTP |
//!
//! The on-disk location for a file-persisted store is derived
//! deterministically from the configuration's identity fields
//! ([`StoreIdentity`]); a sidecar descriptor records what produced the
//! current index so a changed configuration invalidates it instead of
//! silently mixing embedding spaces.

pub mod file;
pub mod location;
pub mod memory;
pub mod remote;
pub mod sitemap_meta;

pub use file::FileStore;
pub use location::{storage_dir, StoreIdentity};
pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use sitemap_meta::{
    load_sitemap_metadata, save_sitemap_metadata, SitemapMetadata, SitemapRecord,
};

use std::sync::Arc;
use toebox_core::{Embedder, Error, RetrieverProvider, RunConfig, StoreError, VectorStore};

/// Compute cosine similarity between two vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Open (or create) the vector store selected by the configuration.
///
/// For the file-persisted provider this loads an existing index when the
/// recorded configuration matches, and starts a fresh one otherwise.
pub async fn open_store(
    config: &RunConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn VectorStore>, Error> {
    match config.retriever_provider {
        RetrieverProvider::Memory => Ok(Arc::new(MemoryStore::new(embedder, config))),
        RetrieverProvider::LocalFile => Ok(Arc::new(FileStore::open(config, embedder).await?)),
        RetrieverProvider::RemoteHttp => Ok(Arc::new(RemoteStore::from_env(
            embedder,
            &config.user_id,
        ))),
    }
}

/// Open the configured store for retrieval only, without triggering
/// ingestion. Fails with [`StoreError::NotIngested`] when the store was
/// never ingested or holds no documents.
pub async fn open_store_for_search(
    config: &RunConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn VectorStore>, Error> {
    match config.retriever_provider {
        RetrieverProvider::Memory => {
            // Per-request memory stores are populated by the ingestion
            // crate before retrieval; an unpopulated one is unusable here.
            Err(Error::Store(StoreError::NotIngested))
        }
        RetrieverProvider::LocalFile => {
            Ok(Arc::new(FileStore::open_for_search(config, embedder).await?))
        }
        RetrieverProvider::RemoteHttp => {
            let store = RemoteStore::from_env(embedder, &config.user_id);
            if store.count().await? == 0 {
                return Err(Error::Store(StoreError::NotIngested));
            }
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        // Same vector = 1.0
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!((sim - 1.0).abs() < 0.001);

        // Orthogonal vectors = 0.0
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert!(sim.abs() < 0.001);

        // Opposite vectors = -1.0
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[-1.0, 0.0, 0.0]);
        assert!((sim + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}

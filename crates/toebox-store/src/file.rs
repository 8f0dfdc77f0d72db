//! File-persisted vector store.
//!
//! A storage location holds four files:
//!
//! - `index.json` — the embedding vectors
//! - `docstore.json` — the documents, parallel to the index
//! - `config.json` — descriptor recording the configuration that produced
//!   the index, plus a creation timestamp
//! - `sitemap_metadata.json` — per-sitemap ingestion bookkeeping
//!   (see [`crate::sitemap_meta`])
//!
//! On open, the identity hash recomputed from the live configuration is
//! compared against a hash of the recorded descriptor; a mismatch deletes
//! the index files and starts fresh, so documents embedded under different
//! models or configuration scopes are never mixed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use toebox_core::{DocChunk, Embedder, RunConfig, ScoredDoc, StoreError, VectorStore};

use crate::cosine_similarity;
use crate::location::{storage_dir, StoreIdentity};

const INDEX_FILE: &str = "index.json";
const DOCSTORE_FILE: &str = "docstore.json";
const CONFIG_FILE: &str = "config.json";

/// Sidecar descriptor recording what produced the current index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDescriptor {
    document_paths: Vec<String>,
    embedding_model: String,
    sitemap_urls: Vec<String>,
    created: DateTime<Utc>,
}

impl StoreDescriptor {
    fn identity(&self) -> StoreIdentity {
        StoreIdentity {
            document_paths: self.document_paths.clone(),
            embedding_model: self.embedding_model.clone(),
            sitemap_urls: self.sitemap_urls.clone(),
        }
    }
}

struct FileStoreInner {
    docs: Vec<DocChunk>,
    vectors: Vec<Vec<f32>>,
}

/// File-persisted vector store with configuration change detection.
pub struct FileStore {
    dir: PathBuf,
    embedder: Arc<dyn Embedder>,
    inner: Arc<RwLock<FileStoreInner>>,
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore").field("dir", &self.dir).finish()
    }
}

/// Per-location persist locks. Concurrent ingestion tasks in one batch may
/// persist the same location; writes are serialized here so the on-disk
/// index never interleaves (last full write wins).
static PERSIST_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>> =
    OnceLock::new();

fn persist_lock(dir: &Path) -> Arc<tokio::sync::Mutex<()>> {
    let registry = PERSIST_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = registry.lock().expect("persist lock registry poisoned");
    map.entry(dir.to_path_buf())
        .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
        .clone()
}

impl FileStore {
    /// Load the store for this configuration, or create an empty one.
    ///
    /// Runs change detection against the recorded descriptor and rewrites
    /// the descriptor to match the live configuration.
    pub async fn open(
        config: &RunConfig,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, StoreError> {
        let dir = storage_dir(config);
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Init(e.to_string()))?;

        let identity = StoreIdentity::from_config(config);
        let config_path = dir.join(CONFIG_FILE);

        let mut config_changed = false;
        if config_path.exists() {
            match std::fs::read_to_string(&config_path)
                .map_err(|e| e.to_string())
                .and_then(|raw| {
                    serde_json::from_str::<StoreDescriptor>(&raw).map_err(|e| e.to_string())
                }) {
                Ok(descriptor) => {
                    if descriptor.identity().hash() != identity.hash() {
                        info!("Configuration has changed, recreating vector store");
                        config_changed = true;
                    }
                }
                Err(e) => {
                    warn!("Error reading store descriptor, recreating vector store: {e}");
                    config_changed = true;
                }
            }
        }

        if config_changed {
            for file in [INDEX_FILE, DOCSTORE_FILE] {
                let path = dir.join(file);
                if path.exists() {
                    if let Err(e) = std::fs::remove_file(&path) {
                        warn!("Failed to remove stale {file}: {e}");
                    }
                }
            }
        }

        let descriptor = StoreDescriptor {
            document_paths: identity.document_paths.clone(),
            embedding_model: identity.embedding_model.clone(),
            sitemap_urls: identity.sitemap_urls.clone(),
            created: Utc::now(),
        };
        let raw = serde_json::to_string_pretty(&descriptor)
            .map_err(|e| StoreError::Init(e.to_string()))?;
        std::fs::write(&config_path, raw).map_err(|e| StoreError::Init(e.to_string()))?;

        let inner = if dir.join(INDEX_FILE).exists() && dir.join(DOCSTORE_FILE).exists() {
            Self::load_files(&dir)?
        } else {
            FileStoreInner {
                docs: Vec::new(),
                vectors: Vec::new(),
            }
        };

        debug!(
            "Opened file store at {:?} ({} documents)",
            dir,
            inner.docs.len()
        );

        Ok(Self {
            dir,
            embedder,
            inner: Arc::new(RwLock::new(inner)),
        })
    }

    /// Open an existing store for retrieval only.
    ///
    /// Fails with [`StoreError::NotIngested`] when the index files are
    /// absent or the store holds no documents.
    pub async fn open_for_search(
        config: &RunConfig,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, StoreError> {
        let dir = storage_dir(config);

        if !dir.join(INDEX_FILE).exists() || !dir.join(DOCSTORE_FILE).exists() {
            return Err(StoreError::NotIngested);
        }

        let inner = Self::load_files(&dir)?;
        if inner.docs.is_empty() {
            return Err(StoreError::NotIngested);
        }

        Ok(Self {
            dir,
            embedder,
            inner: Arc::new(RwLock::new(inner)),
        })
    }

    /// The storage directory backing this handle.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_files(dir: &Path) -> Result<FileStoreInner, StoreError> {
        let docs_raw = std::fs::read_to_string(dir.join(DOCSTORE_FILE))
            .map_err(|e| StoreError::Init(e.to_string()))?;
        let docs: Vec<DocChunk> =
            serde_json::from_str(&docs_raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let vectors_raw = std::fs::read_to_string(dir.join(INDEX_FILE))
            .map_err(|e| StoreError::Init(e.to_string()))?;
        let vectors: Vec<Vec<f32>> =
            serde_json::from_str(&vectors_raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        if docs.len() != vectors.len() {
            return Err(StoreError::Corrupt(format!(
                "docstore holds {} documents but index holds {} vectors",
                docs.len(),
                vectors.len()
            )));
        }

        Ok(FileStoreInner { docs, vectors })
    }
}

#[async_trait]
impl VectorStore for FileStore {
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
            inner.docs.push(doc.clone());
            inner.vectors.push(embedding);
        }
        debug!("Added {} documents to {:?}", docs.len(), self.dir);
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
            .docs
            .iter()
            .zip(inner.vectors.iter())
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
        let lock = persist_lock(&self.dir);
        let _guard = lock.lock().await;

        let (docs_raw, vectors_raw) = {
            let inner = self.inner.read().await;
            let docs_raw = serde_json::to_string(&inner.docs)
                .map_err(|e| StoreError::Persist(e.to_string()))?;
            let vectors_raw = serde_json::to_string(&inner.vectors)
                .map_err(|e| StoreError::Persist(e.to_string()))?;
            (docs_raw, vectors_raw)
        };

        std::fs::write(self.dir.join(DOCSTORE_FILE), docs_raw)
            .map_err(|e| StoreError::Persist(e.to_string()))?;
        std::fs::write(self.dir.join(INDEX_FILE), vectors_raw)
            .map_err(|e| StoreError::Persist(e.to_string()))?;

        debug!("Persisted store to {:?}", self.dir);
        Ok(())
    }

    async fn contains_hash(&self, content_hash: &str) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .docs
            .iter()
            .any(|doc| doc.metadata.content_hash == content_hash))
    }

    async fn delete_by_source(&self, source: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let mut deleted = 0u64;
        let mut index = 0;
        while index < inner.docs.len() {
            if inner.docs[index].metadata.source == source {
                inner.docs.remove(index);
                inner.vectors.remove(index);
                deleted += 1;
            } else {
                index += 1;
            }
        }
        debug!("Deleted {} documents for source {}", deleted, source);
        Ok(deleted)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toebox_core::{DocMetadata, EmbedError};
    use uuid::Uuid;

    /// Deterministic embedder seeded from the text's blake3 hash.
    struct HashEmbedder {
        dimension: usize,
    }

    #[async_trait]
    impl Embedder for HashEmbedder {
        fn model_name(&self) -> &str {
            "hash-embedder"
        }

        async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let hash = blake3::hash(text.as_bytes());
                    let bytes = hash.as_bytes();
                    (0..self.dimension)
                        .map(|i| (f32::from(bytes[i % 32]) / 255.0) - 0.5)
                        .collect()
                })
                .collect())
        }
    }

    fn embedder() -> Arc<dyn Embedder> {
        Arc::new(HashEmbedder { dimension: 32 })
    }

    fn doc(content: &str, hash: &str, source: &str) -> DocChunk {
        DocChunk {
            id: Uuid::new_v4(),
            page_content: content.to_string(),
            metadata: DocMetadata {
                source: source.to_string(),
                title: "test".to_string(),
                user_id: "default".to_string(),
                content_hash: hash.to_string(),
                last_modified: None,
                ingested_at: Utc::now(),
            },
        }
    }

    fn config_in(dir: &Path) -> RunConfig {
        RunConfig {
            index_dir: dir.to_path_buf(),
            sitemap_urls: vec!["https://example.com/sitemap.xml".to_string()],
            ..RunConfig::default()
        }
    }

    #[tokio::test]
    async fn test_open_creates_descriptor() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let store = FileStore::open(&config, embedder()).await.unwrap();
        assert!(store.dir().join(CONFIG_FILE).exists());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let store = FileStore::open(&config, embedder()).await.unwrap();
        store
            .add_documents(&[doc("trail running review", "h1", "s1")])
            .await
            .unwrap();
        store.persist().await.unwrap();

        let reloaded = FileStore::open(&config, embedder()).await.unwrap();
        assert_eq!(reloaded.count().await.unwrap(), 1);
        assert!(reloaded.contains_hash("h1").await.unwrap());
    }

    #[tokio::test]
    async fn test_config_change_invalidates_index() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let store = FileStore::open(&config, embedder()).await.unwrap();
        store
            .add_documents(&[doc("trail running review", "h1", "s1")])
            .await
            .unwrap();
        store.persist().await.unwrap();

        // Overwrite the descriptor so it claims a different embedding model;
        // the next open must discard the index rather than mix spaces.
        let descriptor_path = store.dir().join(CONFIG_FILE);
        let raw = std::fs::read_to_string(&descriptor_path).unwrap();
        let mut descriptor: serde_json::Value = serde_json::from_str(&raw).unwrap();
        descriptor["embeddingModel"] = serde_json::Value::String("openai/other-model".into());
        std::fs::write(&descriptor_path, descriptor.to_string()).unwrap();

        let reopened = FileStore::open(&config, embedder()).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_matching_config_appends_incrementally() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let store = FileStore::open(&config, embedder()).await.unwrap();
        store.add_documents(&[doc("one", "h1", "s1")]).await.unwrap();
        store.persist().await.unwrap();

        let reopened = FileStore::open(&config, embedder()).await.unwrap();
        reopened
            .add_documents(&[doc("two", "h2", "s2")])
            .await
            .unwrap();
        reopened.persist().await.unwrap();

        let final_store = FileStore::open(&config, embedder()).await.unwrap();
        assert_eq!(final_store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_open_for_search_missing_index() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let err = FileStore::open_for_search(&config, embedder())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotIngested));
    }

    #[tokio::test]
    async fn test_open_for_search_empty_store() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let store = FileStore::open(&config, embedder()).await.unwrap();
        store.persist().await.unwrap();

        let err = FileStore::open_for_search(&config, embedder())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotIngested));
    }

    #[tokio::test]
    async fn test_open_for_search_after_ingestion() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let store = FileStore::open(&config, embedder()).await.unwrap();
        store
            .add_documents(&[doc("grippy trail outsole", "h1", "s1")])
            .await
            .unwrap();
        store.persist().await.unwrap();

        let search_store = FileStore::open_for_search(&config, embedder())
            .await
            .unwrap();
        let results = search_store
            .similarity_search("grippy trail outsole", 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].score > 0.99);
    }

    #[tokio::test]
    async fn test_delete_by_source_removes_parallel_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let store = FileStore::open(&config, embedder()).await.unwrap();
        store
            .add_documents(&[
                doc("a", "h1", "url-1"),
                doc("b", "h2", "url-1"),
                doc("c", "h3", "url-2"),
            ])
            .await
            .unwrap();

        let deleted = store.delete_by_source("url-1").await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.contains_hash("h3").await.unwrap());
        assert!(!store.contains_hash("h1").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_docstore_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path());

        let store = FileStore::open(&config, embedder()).await.unwrap();
        store.add_documents(&[doc("a", "h1", "s1")]).await.unwrap();
        store.persist().await.unwrap();

        std::fs::write(store.dir().join(DOCSTORE_FILE), "not json").unwrap();
        let err = FileStore::open_for_search(&config, embedder())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}

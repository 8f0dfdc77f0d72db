//! The ingestion pipeline and retriever opening.
//!
//! Ingestion walks two source kinds:
//!
//! - **local paths**: files or directories of word-processor documents,
//!   hashed by raw content;
//! - **sitemaps**: fetched, short-circuited by body hash, then fanned out
//!   per URL with content-hash de-duplication.
//!
//! A URL whose content hash already exists in the store is skipped; a URL
//! whose last-modified value changed gets a fresh hash, its previous chunks
//! are superseded, and the new chunk set is added. Per-item failures are
//! logged and skipped; the batch always continues.

use chrono::Utc;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use toebox_core::{
    DocChunk, DocMetadata, Embedder, Error, Fetcher, Result, RetrieverProvider, RunConfig,
    SourceError, VectorStore,
};
use toebox_embed::resolve_embedder;
use toebox_store::{
    load_sitemap_metadata, open_store, open_store_for_search, save_sitemap_metadata, storage_dir,
    MemoryStore, SitemapRecord,
};

use crate::chunker::split_text;
use crate::docx::extract_docx_text;
use crate::fetch::HttpFetcher;
use crate::html::{html_to_text, looks_like_html};
use crate::sitemap::{parse_sitemap, SitemapEntry};

/// Nested sitemap indexes deeper than this are not followed.
const MAX_SITEMAP_DEPTH: usize = 3;

/// Counters for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Chunks added to the store
    pub documents_added: usize,
    /// Sources skipped because their content hash was already present
    /// or they held no usable text
    pub sources_skipped: usize,
    /// Whole sitemaps skipped because their body was unchanged
    pub sitemaps_skipped: usize,
    /// Items that failed and were dropped without aborting the batch
    pub failures: usize,
}

enum SourceOutcome {
    Added(usize),
    Skipped,
    Failed,
}

impl IngestReport {
    fn record(&mut self, outcome: SourceOutcome) {
        match outcome {
            SourceOutcome::Added(count) => self.documents_added += count,
            SourceOutcome::Skipped => self.sources_skipped += 1,
            SourceOutcome::Failed => self.failures += 1,
        }
    }
}

/// Ingest every configured source into the configured store.
pub async fn ingest(config: &RunConfig) -> Result<IngestReport> {
    let embedder = resolve_embedder(&config.embedding_model)?;
    ingest_with(config, embedder, Arc::new(HttpFetcher::new())).await
}

/// Ingest with explicit embedding and fetching capabilities.
pub async fn ingest_with(
    config: &RunConfig,
    embedder: Arc<dyn Embedder>,
    fetcher: Arc<dyn Fetcher>,
) -> Result<IngestReport> {
    let store = open_store(config, embedder).await?;
    let mut report = IngestReport::default();

    ingest_local_paths(config, &store, &mut report).await;
    ingest_sitemaps(config, &store, &fetcher, &mut report).await;

    info!(
        "Ingestion finished: {} chunks added, {} sources skipped, {} sitemaps skipped, {} failures",
        report.documents_added, report.sources_skipped, report.sitemaps_skipped, report.failures
    );
    Ok(report)
}

/// Open the configured store for retrieval.
///
/// The in-memory provider builds its store from the configured document
/// paths on every call; the persisted providers load what ingestion wrote
/// and fail with a store-not-ingested error when nothing is there.
pub async fn open_retriever(config: &RunConfig) -> Result<Arc<dyn VectorStore>> {
    let embedder = resolve_embedder(&config.embedding_model)?;
    open_retriever_with(config, embedder).await
}

/// Open the configured store for retrieval with an explicit embedder.
pub async fn open_retriever_with(
    config: &RunConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn VectorStore>> {
    match config.retriever_provider {
        RetrieverProvider::Memory => {
            let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new(embedder, config));
            let mut report = IngestReport::default();
            ingest_local_paths(config, &store, &mut report).await;
            if store.count().await.map_err(Error::Store)? == 0 {
                warn!("No documents were loaded from the configured document paths");
            }
            Ok(store)
        }
        RetrieverProvider::LocalFile | RetrieverProvider::RemoteHttp => {
            open_store_for_search(config, embedder).await
        }
    }
}

// ============================================================================
// Local sources
// ============================================================================

async fn ingest_local_paths(
    config: &RunConfig,
    store: &Arc<dyn VectorStore>,
    report: &mut IngestReport,
) {
    let mut files = Vec::new();

    for path in &config.document_paths {
        if !path.exists() {
            warn!("Path does not exist: {:?}", path);
            report.failures += 1;
            continue;
        }

        if path.is_dir() {
            match collect_document_files(path) {
                Ok(mut found) => files.append(&mut found),
                Err(e) => {
                    warn!("Error processing directory {:?}: {}", path, e);
                    report.failures += 1;
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    for file in files {
        if file.extension().and_then(|e| e.to_str()).map(str::to_lowercase)
            != Some("docx".to_string())
        {
            warn!("Unsupported file type: {:?}", file);
            report.sources_skipped += 1;
            continue;
        }

        match ingest_docx_file(store, &config.user_id, &file).await {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                warn!("Error loading file {:?}: {}", file, e);
                report.failures += 1;
            }
        }
    }
}

/// Expand a directory to its contained supported document files.
fn collect_document_files(dir: &Path) -> std::result::Result<Vec<PathBuf>, SourceError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
        if supported {
            files.push(path);
        } else {
            warn!("Skipping unsupported file: {:?}", path);
        }
    }
    Ok(files)
}

async fn ingest_docx_file(
    store: &Arc<dyn VectorStore>,
    user_id: &str,
    path: &Path,
) -> std::result::Result<SourceOutcome, Error> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::Source(SourceError::Io(e)))?;
    let content_hash = blake3::hash(&bytes).to_hex().to_string();

    if store
        .contains_hash(&content_hash)
        .await
        .map_err(Error::Store)?
    {
        debug!("Skipping file {:?} - content hash already present", path);
        return Ok(SourceOutcome::Skipped);
    }

    let text = extract_docx_text(&bytes).map_err(Error::Source)?;
    let chunks = split_text(&text);
    if chunks.is_empty() {
        debug!("Empty content for {:?}, skipping", path);
        return Ok(SourceOutcome::Skipped);
    }

    let source = path.to_string_lossy().into_owned();
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.clone());

    let docs = build_chunks(&chunks, &source, &title, user_id, &content_hash, None);

    // Supersede any earlier version of this file before adding the new one
    if let Err(e) = store.delete_by_source(&source).await {
        warn!("Failed to supersede earlier chunks for {:?}: {}", path, e);
    }
    let added = docs.len();
    store.add_documents(&docs).await.map_err(Error::Store)?;
    store.persist().await.map_err(Error::Store)?;

    info!("Indexed {:?} ({} chunks)", path, added);
    Ok(SourceOutcome::Added(added))
}

// ============================================================================
// Sitemap sources
// ============================================================================

async fn ingest_sitemaps(
    config: &RunConfig,
    store: &Arc<dyn VectorStore>,
    fetcher: &Arc<dyn Fetcher>,
    report: &mut IngestReport,
) {
    if config.sitemap_urls.is_empty() {
        return;
    }

    // Sitemap bookkeeping lives beside the persisted index; the other
    // providers re-check per URL instead.
    let meta_dir = (config.retriever_provider == RetrieverProvider::LocalFile)
        .then(|| storage_dir(config));
    let mut metadata = meta_dir
        .as_deref()
        .map(load_sitemap_metadata)
        .unwrap_or_default();

    for sitemap_url in &config.sitemap_urls {
        debug!("Checking sitemap: {}", sitemap_url);

        let body = match fetcher.fetch(sitemap_url).await {
            Ok(body) => body,
            Err(e) => {
                error!("Error processing sitemap {}: {}", sitemap_url, e);
                report.failures += 1;
                continue;
            }
        };

        let body_hash = blake3::hash(body.as_bytes()).to_hex().to_string();
        let unchanged = metadata
            .get(sitemap_url)
            .is_some_and(|record| record.last_modified == body_hash);
        if unchanged {
            info!(
                "Sitemap {} unchanged since last ingestion, skipping",
                sitemap_url
            );
            report.sitemaps_skipped += 1;
            continue;
        }

        let entries = collect_entries(fetcher, &body, 0).await;
        info!("Found {} URLs in sitemap: {}", entries.len(), sitemap_url);

        let tasks = entries.into_iter().map(|entry| {
            let store = Arc::clone(store);
            let fetcher = Arc::clone(fetcher);
            let user_id = config.user_id.clone();
            async move { ingest_url(&store, &fetcher, &user_id, entry).await }
        });

        for outcome in join_all(tasks).await {
            report.record(outcome);
        }

        metadata.insert(
            sitemap_url.clone(),
            SitemapRecord {
                last_modified: body_hash,
                last_ingestion_date: Utc::now(),
            },
        );
        if let Some(dir) = meta_dir.as_deref() {
            if let Err(e) = save_sitemap_metadata(dir, &metadata) {
                warn!("Failed to save sitemap metadata: {e}");
            }
        }
    }
}

/// Collect content entries, following nested sitemap indexes.
async fn collect_entries(
    fetcher: &Arc<dyn Fetcher>,
    body: &str,
    depth: usize,
) -> Vec<SitemapEntry> {
    let parsed = parse_sitemap(body);
    let mut entries = parsed.entries;

    if depth < MAX_SITEMAP_DEPTH {
        for nested_url in parsed.nested {
            match fetcher.fetch(&nested_url).await {
                Ok(nested_body) => {
                    let mut nested =
                        Box::pin(collect_entries(fetcher, &nested_body, depth + 1)).await;
                    entries.append(&mut nested);
                }
                Err(e) => {
                    warn!("Error fetching nested sitemap {}: {}", nested_url, e);
                }
            }
        }
    }

    entries
}

async fn ingest_url(
    store: &Arc<dyn VectorStore>,
    fetcher: &Arc<dyn Fetcher>,
    user_id: &str,
    entry: SitemapEntry,
) -> SourceOutcome {
    // The hash covers the URL plus its last-modified value, so a bumped
    // lastmod invalidates the previous hash
    let hash_input = match entry.last_modified.as_deref() {
        Some(lastmod) => format!("{}:{}", entry.url, lastmod),
        None => entry.url.clone(),
    };
    let content_hash = blake3::hash(hash_input.as_bytes()).to_hex().to_string();

    match store.contains_hash(&content_hash).await {
        Ok(true) => {
            debug!(
                "Skipping URL: {} - document with same hash already exists",
                entry.url
            );
            return SourceOutcome::Skipped;
        }
        Ok(false) => {}
        Err(e) => {
            warn!("Error checking for existing document: {e}. Will process URL.");
        }
    }

    let content = match fetcher.fetch(&entry.url).await {
        Ok(content) => content,
        Err(e) => {
            error!("Error processing URL {}: {}", entry.url, e);
            return SourceOutcome::Failed;
        }
    };

    let text = if looks_like_html(&entry.url, &content) {
        html_to_text(&content)
    } else {
        content
    };

    let chunks = split_text(&text);
    if chunks.is_empty() {
        debug!("No usable text at {}, skipping", entry.url);
        return SourceOutcome::Skipped;
    }

    let title = title_from_url(&entry.url);
    let docs = build_chunks(
        &chunks,
        &entry.url,
        &title,
        user_id,
        &content_hash,
        entry.last_modified.as_deref(),
    );

    // Supersede chunks from the previous version of this URL
    if let Err(e) = store.delete_by_source(&entry.url).await {
        warn!("Failed to supersede earlier chunks for {}: {}", entry.url, e);
    }

    let added = docs.len();
    if let Err(e) = store.add_documents(&docs).await {
        error!("Error adding documents from {}: {}", entry.url, e);
        return SourceOutcome::Failed;
    }
    if let Err(e) = store.persist().await {
        warn!("Error persisting store after {}: {}", entry.url, e);
    }

    info!("Added {} documents from URL: {}", added, entry.url);
    SourceOutcome::Added(added)
}

fn build_chunks(
    chunks: &[String],
    source: &str,
    title: &str,
    user_id: &str,
    content_hash: &str,
    last_modified: Option<&str>,
) -> Vec<DocChunk> {
    let now = Utc::now();
    chunks
        .iter()
        .map(|content| DocChunk {
            id: Uuid::new_v4(),
            page_content: content.clone(),
            metadata: DocMetadata {
                source: source.to_string(),
                title: title.to_string(),
                user_id: user_id.to_string(),
                content_hash: content_hash.to_string(),
                last_modified: last_modified.map(String::from),
                ingested_at: now,
            },
        })
        .collect()
}

/// Human-readable title: the last URL path segment.
fn title_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let without_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    without_query
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(without_query)
        .to_string()
}

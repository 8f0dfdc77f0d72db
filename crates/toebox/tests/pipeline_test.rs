//! Integration tests for the full pipeline.
//!
//! Exercises the complete flow offline: sitemap ingestion → persisted
//! store → threshold retrieval → the orchestrated conversational turn.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use toebox_core::{
    ChatMessage, EmbedError, Embedder, Fetcher, Role, RunConfig, ShoeRecord, SourceError,
};
use toebox_graph::{ConversationState, ShoeGraph};
use toebox_ingest::{ingest_with, open_retriever_with};
use toebox_llm::ScriptedChatModel;
use toebox_query::SqliteCatalog;
use toebox_retrieve::{retrieve, RetrieveOptions};

/// Deterministic embedder seeded from the text's blake3 hash.
struct HashEmbedder;

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
                (0..32)
                    .map(|i| (f32::from(bytes[i]) / 255.0) - 0.5)
                    .collect()
            })
            .collect())
    }
}

/// In-memory fetcher keyed by URL.
struct FakeFetcher {
    pages: Mutex<HashMap<String, String>>,
}

impl FakeFetcher {
    fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
        }
    }

    fn set(&self, url: &str, body: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), body.to_string());
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::Fetch {
                url: url.to_string(),
                reason: "not found".to_string(),
            })
    }
}

const SUPERIOR_REVIEW: &str =
    "The Superior 6 is a lightweight zero drop trail shoe with a roomy toe box.";
const ESCALANTE_REVIEW: &str =
    "The Escalante 4 is a flexible road shoe built for daily miles and walking.";

fn review_config(index_dir: &Path) -> RunConfig {
    RunConfig {
        index_dir: index_dir.to_path_buf(),
        sitemap_urls: vec!["https://example.com/sitemap.xml".to_string()],
        ..RunConfig::default()
    }
}

fn seeded_fetcher() -> Arc<FakeFetcher> {
    let fetcher = Arc::new(FakeFetcher::new());
    fetcher.set(
        "https://example.com/sitemap.xml",
        "<urlset>\
         <url><loc>https://example.com/reviews/superior-6</loc><lastmod>2025-05-01</lastmod></url>\
         <url><loc>https://example.com/reviews/escalante-4</loc><lastmod>2025-06-01</lastmod></url>\
         </urlset>",
    );
    fetcher.set("https://example.com/reviews/superior-6", SUPERIOR_REVIEW);
    fetcher.set("https://example.com/reviews/escalante-4", ESCALANTE_REVIEW);
    fetcher
}

#[tokio::test]
async fn test_ingest_then_retrieve_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let config = review_config(tmp.path());
    let fetcher = seeded_fetcher();

    let report = ingest_with(&config, Arc::new(HashEmbedder), fetcher.clone())
        .await
        .unwrap();
    assert_eq!(report.documents_added, 2);
    assert_eq!(report.failures, 0);

    let store = open_retriever_with(&config, Arc::new(HashEmbedder))
        .await
        .unwrap();

    // The identical text embeds to the identical vector, so the matching
    // review dominates
    let results = retrieve(
        store.as_ref(),
        SUPERIOR_REVIEW,
        &RetrieveOptions::default(),
        0.0,
    )
    .await
    .unwrap();

    assert!(!results.is_empty());
    assert!(results[0].score > 0.99);
    assert!(results[0].doc.page_content.contains("Superior 6"));
    assert!(results.iter().all(|d| d.score >= 0.3));
}

#[tokio::test]
async fn test_second_ingestion_run_is_a_noop() {
    let tmp = tempfile::tempdir().unwrap();
    let config = review_config(tmp.path());
    let fetcher = seeded_fetcher();

    let first = ingest_with(&config, Arc::new(HashEmbedder), fetcher.clone())
        .await
        .unwrap();
    assert_eq!(first.documents_added, 2);

    let second = ingest_with(&config, Arc::new(HashEmbedder), fetcher.clone())
        .await
        .unwrap();
    assert_eq!(second.documents_added, 0);
    assert_eq!(second.sitemaps_skipped, 1);

    let store = open_retriever_with(&config, Arc::new(HashEmbedder))
        .await
        .unwrap();
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_recency_weight_prefers_newer_on_ties() {
    let tmp = tempfile::tempdir().unwrap();
    let config = review_config(tmp.path());
    let fetcher = seeded_fetcher();

    ingest_with(&config, Arc::new(HashEmbedder), fetcher)
        .await
        .unwrap();
    let store = open_retriever_with(&config, Arc::new(HashEmbedder))
        .await
        .unwrap();

    // Fully recency-weighted ordering puts the June review above the May
    // one whatever the similarity ordering says
    let results = retrieve(store.as_ref(), "running shoe", &RetrieveOptions {
        min_score: -1.0,
        k_increment: 2,
        max_k: 4,
    }, 1.0)
    .await
    .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].doc.page_content.contains("Escalante"));
}

#[tokio::test]
async fn test_full_conversational_turn_over_ingested_store() {
    let tmp = tempfile::tempdir().unwrap();
    let config = review_config(tmp.path());
    let fetcher = seeded_fetcher();

    ingest_with(&config, Arc::new(HashEmbedder), fetcher)
        .await
        .unwrap();

    let catalog = SqliteCatalog::open_in_memory().unwrap();
    catalog.init_schema().unwrap();
    catalog
        .insert_shoe(&ShoeRecord {
            id: 0,
            brand: "Altra".to_string(),
            model: "Superior 6".to_string(),
            forefoot_stack_height_mm: Some(23.0),
            heel_stack_height_mm: Some(23.0),
            drop_mm: Some(0.0),
            fit: Some("standard".to_string()),
            wide_option: false,
            intended_use: Some("trail".to_string()),
            description: None,
            genders: vec![],
            reviews: vec![],
        })
        .unwrap();

    // lookup YES → fetch; retrieve YES → generate + retrieve; respond
    let query_model = ScriptedChatModel::with_replies([
        "YES".to_string(),
        "YES".to_string(),
        format!(r#"{{"query": "{SUPERIOR_REVIEW}"}}"#),
    ]);
    let response_model = ScriptedChatModel::with_replies([
        r#"{"drop": {"min": 0, "max": 0}, "stackHeightMm": "empty",
            "width": "empty", "intendedUse": "empty", "gender": "empty"}"#,
        "The Superior 6 fits the bill.",
    ]);

    let graph = ShoeGraph::with_capabilities(
        config,
        Arc::new(catalog),
        Arc::new(query_model),
        Arc::new(response_model),
        Arc::new(HashEmbedder),
    );

    let mut state =
        ConversationState::new(vec![ChatMessage::user("Show me shoes with zero drop")]);
    graph.run(&mut state).await.unwrap();

    assert_eq!(state.relevant_shoes.len(), 1);
    assert_eq!(state.relevant_shoes[0].model, "Superior 6");

    assert!(!state.retrieved_docs.is_empty());
    assert!(state.retrieved_docs[0].doc.page_content.contains("Superior 6"));

    let last = state.messages.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, "The Superior 6 fits the bill.");
}

//! Per-invocation configuration.
//!
//! [`RunConfig`] is an immutable snapshot resolved once per request:
//! caller-supplied overrides are merged onto defaults through serde's
//! default mechanism, and the result is never mutated or persisted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::prompts::{QUERY_SYSTEM_PROMPT_TEMPLATE, RESPONSE_SYSTEM_PROMPT_TEMPLATE};

/// Vector store backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetrieverProvider {
    /// Brute-force in-memory store, built per request from document paths
    Memory,
    /// File-persisted index under the configured index directory
    #[default]
    LocalFile,
    /// Managed remote vector service spoken to over HTTP
    RemoteHttp,
}

/// The complete configuration for one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Owner partition key scoping which documents a retrieval may return
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Embedding model in `provider/model` form
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Vector store backend
    #[serde(default)]
    pub retriever_provider: RetrieverProvider,

    /// Paths to document files or directories for local ingestion
    #[serde(default)]
    pub document_paths: Vec<PathBuf>,

    /// Sitemap URLs enumerating remote content to ingest
    #[serde(default)]
    pub sitemap_urls: Vec<String>,

    /// Additional free-form search parameters
    #[serde(default)]
    pub search_kwargs: HashMap<String, serde_json::Value>,

    /// Weight given to recency when ranking documents, in [0, 1].
    /// 0 means pure similarity; 1 means pure recency.
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f32,

    /// System prompt template for response composition
    #[serde(default = "default_response_prompt")]
    pub response_system_prompt_template: String,

    /// Chat model for response composition, in `provider/model` form
    #[serde(default = "default_response_model")]
    pub response_model: String,

    /// System prompt template for search-query generation
    #[serde(default = "default_query_prompt")]
    pub query_system_prompt_template: String,

    /// Chat model for query generation and routing, in `provider/model` form
    #[serde(default = "default_query_model")]
    pub query_model: String,

    /// Base directory for persisted vector indices
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
}

fn default_user_id() -> String {
    // Shared partition for documents that belong to no particular user
    "default".to_string()
}

fn default_embedding_model() -> String {
    "openai/text-embedding-3-small".to_string()
}

fn default_recency_weight() -> f32 {
    0.3
}

fn default_response_prompt() -> String {
    RESPONSE_SYSTEM_PROMPT_TEMPLATE.to_string()
}

fn default_response_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_query_prompt() -> String {
    QUERY_SYSTEM_PROMPT_TEMPLATE.to_string()
}

fn default_query_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("vector_store")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            embedding_model: default_embedding_model(),
            retriever_provider: RetrieverProvider::default(),
            document_paths: Vec::new(),
            sitemap_urls: Vec::new(),
            search_kwargs: HashMap::new(),
            recency_weight: default_recency_weight(),
            response_system_prompt_template: default_response_prompt(),
            response_model: default_response_model(),
            query_system_prompt_template: default_query_prompt(),
            query_model: default_query_model(),
            index_dir: default_index_dir(),
        }
    }
}

impl RunConfig {
    /// Merge a partial JSON override object onto the defaults.
    pub fn from_overrides(overrides: serde_json::Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(overrides)?)
    }
}

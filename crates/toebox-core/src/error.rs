//! Error types for the toebox pipeline.

use thiserror::Error;

/// Main error type for toebox operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Document source failed (missing path, unreachable URL, bad sitemap)
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),

    /// Chat model call failed
    #[error("model error: {0}")]
    Llm(#[from] LlmError),

    /// Vector store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Relational catalog operation failed
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Structured query translation failed
    #[error("translation error: {0}")]
    Translate(#[from] TranslateError),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error — fatal to the current request, never retried
    #[error("config error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Document source errors.
///
/// These are always recovered locally: the offending item is logged and
/// skipped, and the rest of the batch continues.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("path does not exist: {0}")]
    Missing(String),

    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Embedding errors.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Chat model errors.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("malformed model output: {0}")]
    Malformed(String),
}

/// Vector store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store initialization failed: {0}")]
    Init(String),

    #[error("insert failed: {0}")]
    Insert(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("delete failed: {0}")]
    Delete(String),

    #[error("persist failed: {0}")]
    Persist(String),

    /// The store was never ingested (index files absent) or is empty.
    /// Surfaced to the caller as-is; the only hard stop in the retrieval path.
    #[error("vector store not found or empty, run ingestion first")]
    NotIngested,

    #[error("corrupt store: {0}")]
    Corrupt(String),
}

/// Relational shoe-catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog open failed: {0}")]
    Open(String),

    #[error("catalog query failed: {0}")]
    Query(String),
}

/// Structured query translation errors.
///
/// Never surfaced to the end user: the translator falls back to naive
/// keyword extraction instead.
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("output did not match conditions schema: {0}")]
    Schema(String),
}

/// Result type alias for toebox operations.
pub type Result<T> = std::result::Result<T, Error>;

//! # toebox-core
//!
//! Core types and traits for the toebox shoe-recommendation retrieval pipeline.
//!
//! This crate provides the foundational abstractions used throughout toebox:
//!
//! - **Embedding Generation**: [`Embedder`] trait for converting text to vector embeddings
//! - **Chat Models**: [`ChatModel`] trait for free-text and schema-constrained model calls
//! - **Vector Storage**: [`VectorStore`] trait for storing and searching indexed documents
//! - **Content Fetching**: [`Fetcher`] trait for retrieving remote sources
//!
//! ## Architecture
//!
//! The crate is organized around a pipeline pattern:
//!
//! ```text
//! Source → fetch → normalize → chunk → Embedder → VectorStore
//!                                                      ↓
//!                                      query text → ScoredDoc results
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DocChunk`] | A slice of source content with provenance metadata |
//! | [`ScoredDoc`] | A retrieved chunk with its similarity score |
//! | [`ChatMessage`] | A role-tagged conversation turn |
//! | [`ShoeRecord`] | A shoe row with its gender-variant and review sub-entities |
//! | [`RunConfig`] | Immutable per-invocation configuration snapshot |
//!
//! ## Related Crates
//!
//! - `toebox-embed`: embedding-provider resolution
//! - `toebox-llm`: chat-model resolution and structured output
//! - `toebox-store`: vector-store backends and change detection
//! - `toebox-ingest`: document ingestion pipeline
//! - `toebox-retrieve`: score-threshold retrieval with recency blending
//! - `toebox-query`: natural-language to structured shoe query translation
//! - `toebox-graph`: the pipeline orchestrator

pub mod config;
pub mod error;
pub mod prompts;
pub mod traits;
pub mod types;

pub use config::{RetrieverProvider, RunConfig};
pub use error::{
    CatalogError, EmbedError, Error, LlmError, Result, SourceError, StoreError, TranslateError,
};
pub use traits::*;
pub use types::*;

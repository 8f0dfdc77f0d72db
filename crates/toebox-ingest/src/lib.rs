//! # toebox-ingest
//!
//! Document ingestion for toebox.
//!
//! Sources are local word-processor documents (paths or directories of
//! `.docx` files) and remote content enumerated by sitemaps. Content is
//! normalized to plain text, chunked with overlap, tagged with provenance
//! metadata, and added to the configured vector store with content-hash
//! de-duplication and per-sitemap short-circuiting.
//!
//! Per-item failures are logged and skipped; one bad file or URL never
//! aborts the batch.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pipeline`] | The ingestion entry points and retriever opening |
//! | [`chunker`] | Fixed-size overlapping text windows |
//! | [`html`] | HTML detection and text normalization |
//! | [`docx`] | Word-processor document text extraction |
//! | [`sitemap`] | Sitemap parsing |
//! | [`fetch`] | HTTP fetching behind the `Fetcher` seam |

pub mod chunker;
pub mod docx;
pub mod fetch;
pub mod html;
pub mod pipeline;
pub mod sitemap;

pub use fetch::HttpFetcher;
pub use pipeline::{
    ingest, ingest_with, open_retriever, open_retriever_with, IngestReport,
};

//! Per-sitemap ingestion bookkeeping.
//!
//! A storage location records, for each sitemap URL, a hash of the last
//! fetched sitemap body and the instant of the last successful ingestion.
//! An unchanged body hash lets a whole sitemap be skipped without per-URL
//! checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use toebox_core::StoreError;

/// File name of the sitemap metadata sidecar.
pub const SITEMAP_METADATA_FILE: &str = "sitemap_metadata.json";

/// Bookkeeping for one sitemap URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapRecord {
    /// Hash of the sitemap body at last ingestion
    pub last_modified: String,
    /// When the sitemap was last successfully ingested
    pub last_ingestion_date: DateTime<Utc>,
}

/// Sitemap bookkeeping keyed by sitemap URL.
pub type SitemapMetadata = HashMap<String, SitemapRecord>;

/// Load the sitemap metadata for a storage location.
///
/// A missing or unreadable file degrades to an empty map; ingestion then
/// simply re-processes every sitemap.
pub fn load_sitemap_metadata(dir: &Path) -> SitemapMetadata {
    let path = dir.join(SITEMAP_METADATA_FILE);
    if !path.exists() {
        return SitemapMetadata::new();
    }
    match std::fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Error reading sitemap metadata, will recreate: {e}");
                SitemapMetadata::new()
            }
        },
        Err(e) => {
            warn!("Error reading sitemap metadata, will recreate: {e}");
            SitemapMetadata::new()
        }
    }
}

/// Persist the sitemap metadata for a storage location.
pub fn save_sitemap_metadata(dir: &Path, meta: &SitemapMetadata) -> Result<(), StoreError> {
    let raw =
        serde_json::to_string_pretty(meta).map_err(|e| StoreError::Persist(e.to_string()))?;
    std::fs::write(dir.join(SITEMAP_METADATA_FILE), raw)
        .map_err(|e| StoreError::Persist(e.to_string()))
}

//! Core types for toebox.
//!
//! This module contains the shared data structures used across the pipeline:
//!
//! ## Indexed Documents
//! - [`DocChunk`]: a bounded slice of source content with provenance metadata
//! - [`DocMetadata`]: source locator, owner partition, content hash, timestamps
//! - [`ScoredDoc`]: a retrieved chunk with its similarity score
//!
//! ## Conversation
//! - [`ChatMessage`] / [`Role`]: role-tagged conversation turns
//!
//! ## Shoe Catalog
//! - [`ShoeRecord`]: a shoe row with its [`ShoeGender`] and [`ShoeReview`] sub-entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Indexed Documents
// ============================================================================

/// A chunk of source content, immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocChunk {
    /// Unique chunk identifier
    pub id: Uuid,
    /// The chunk text
    pub page_content: String,
    /// Provenance metadata
    pub metadata: DocMetadata,
}

/// Provenance metadata attached to every chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMetadata {
    /// Source locator (URL or file path)
    pub source: String,
    /// Human-readable title, derived from the last path/URL segment
    pub title: String,
    /// Owner partition key
    pub user_id: String,
    /// Identity+version fingerprint used for de-duplication
    pub content_hash: String,
    /// Last-modified value reported by the source, when available
    pub last_modified: Option<String>,
    /// When the chunk was ingested
    pub ingested_at: DateTime<Utc>,
}

impl DocMetadata {
    /// Timestamp used for recency ranking: the parsed last-modified value
    /// when present, the ingestion instant otherwise.
    pub fn recency_timestamp(&self) -> Option<DateTime<Utc>> {
        if let Some(ref raw) = self.last_modified {
            if let Some(ts) = parse_timestamp(raw) {
                return Some(ts);
            }
        }
        Some(self.ingested_at)
    }
}

/// Parse a sitemap-style timestamp: RFC 3339 or a bare `YYYY-MM-DD` date.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    None
}

/// A search hit: a chunk plus its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDoc {
    pub doc: DocChunk,
    pub score: f32,
}

// ============================================================================
// Conversation
// ============================================================================

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ============================================================================
// Shoe Catalog
// ============================================================================

/// A shoe row with its related sub-entities, as returned by the catalog
/// read path. Schema ownership lives with the external persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoeRecord {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub forefoot_stack_height_mm: Option<f64>,
    pub heel_stack_height_mm: Option<f64>,
    pub drop_mm: Option<f64>,
    pub fit: Option<String>,
    pub wide_option: bool,
    pub intended_use: Option<String>,
    pub description: Option<String>,
    pub genders: Vec<ShoeGender>,
    pub reviews: Vec<ShoeReview>,
}

impl ShoeRecord {
    /// Drop in millimeters: the stored column when present, otherwise the
    /// heel/forefoot difference when both measurements exist.
    pub fn drop_value(&self) -> Option<f64> {
        self.drop_mm.or_else(|| {
            match (self.heel_stack_height_mm, self.forefoot_stack_height_mm) {
                (Some(heel), Some(forefoot)) => Some(heel - forefoot),
                _ => None,
            }
        })
    }
}

/// A gender-specific variant of a shoe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoeGender {
    pub gender: String,
    pub price: Option<f64>,
    pub price_rrp: Option<f64>,
    pub weight_grams: Option<f64>,
    /// Image blob reference; the blob store itself is external.
    pub image_id: Option<String>,
}

/// Review text attached to a shoe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoeReview {
    pub fit: Option<String>,
    pub feel: Option<String>,
    pub durability: Option<String>,
}

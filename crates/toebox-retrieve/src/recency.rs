//! Recency-biased re-ranking.
//!
//! Each result's final ranking score is
//! `similarity * (1 - w) + normalized_recency * w`, where the recency of a
//! document is its timestamp mapped linearly into [0, 1] over the min/max
//! span of the current result set. Documents without a timestamp count as
//! the oldest. A zero span (all documents share one timestamp) skips
//! blending and keeps the original order.

use tracing::debug;

use toebox_core::ScoredDoc;

/// Re-order results by blending similarity with recency.
///
/// `recency_weight` is clamped conceptually to [0, 1]; a weight of zero or
/// a single-element input returns the docs unchanged.
pub fn apply_recency_bias(docs: Vec<ScoredDoc>, recency_weight: f32) -> Vec<ScoredDoc> {
    if recency_weight <= 0.0 || docs.len() <= 1 {
        return docs;
    }

    let timestamps: Vec<Option<i64>> = docs
        .iter()
        .map(|d| d.doc.metadata.recency_timestamp().map(|t| t.timestamp_millis()))
        .collect();

    let known: Vec<i64> = timestamps.iter().flatten().copied().collect();
    let (Some(&min), Some(&max)) = (known.iter().min(), known.iter().max()) else {
        return docs;
    };
    if min == max {
        // No spread to rank on; keep similarity order
        return docs;
    }

    let span = (max - min) as f64;
    let mut blended: Vec<(f64, ScoredDoc)> = docs
        .into_iter()
        .zip(timestamps)
        .map(|(doc, timestamp)| {
            let normalized_recency = match timestamp {
                Some(ts) => (ts - min) as f64 / span,
                None => 0.0,
            };
            let combined = f64::from(doc.score) * f64::from(1.0 - recency_weight)
                + normalized_recency * f64::from(recency_weight);
            (combined, doc)
        })
        .collect();

    // Stable sort: ties keep their input order
    blended.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    debug!("Applied recency bias (weight {})", recency_weight);
    blended.into_iter().map(|(_, doc)| doc).collect()
}

//! Minimum-score retrieval with adaptive breadth.

use tracing::debug;

use toebox_core::{ScoredDoc, StoreError, VectorStore};

/// Tuning for threshold retrieval.
#[derive(Debug, Clone, Copy)]
pub struct RetrieveOptions {
    /// Minimum similarity score a candidate must meet to be included
    pub min_score: f32,
    /// How many extra candidates each widening step fetches
    pub k_increment: usize,
    /// Candidate ceiling
    pub max_k: usize,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            min_score: 0.3,
            k_increment: 2,
            max_k: 4,
        }
    }
}

/// Search with a minimum similarity threshold, widening the candidate count
/// until the threshold boundary is inside the fetched window, the store is
/// exhausted, or the ceiling is reached.
///
/// Returns at most `max_k` documents, all scoring at least `min_score`,
/// in descending score order.
pub async fn retrieve_with_threshold(
    store: &dyn VectorStore,
    query: &str,
    options: &RetrieveOptions,
) -> Result<Vec<ScoredDoc>, StoreError> {
    let max_k = options.max_k.max(1);
    let increment = options.k_increment.max(1);

    let mut k = increment.min(max_k);
    loop {
        let hits = store.similarity_search(query, k).await?;
        let exhausted = hits.len() < k;
        let mut qualifying: Vec<ScoredDoc> = hits
            .into_iter()
            .filter(|d| d.score >= options.min_score)
            .collect();

        // A candidate below the threshold means every qualifying document is
        // already inside the window; fetching wider cannot add more.
        let boundary_found = qualifying.len() < k && !exhausted;

        if boundary_found || exhausted || k >= max_k {
            debug!(
                "Threshold retrieval: {} qualifying of {} fetched (k={})",
                qualifying.len(),
                k,
                k
            );
            qualifying.truncate(max_k);
            return Ok(qualifying);
        }

        k = (k + increment).min(max_k);
    }
}

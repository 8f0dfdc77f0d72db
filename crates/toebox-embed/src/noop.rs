//! No-op embedder for testing without a provider account.

use async_trait::async_trait;
use toebox_core::{EmbedError, Embedder};

/// No-op embedder that returns zero-vectors.
///
/// Useful for exercising store and pipeline plumbing in tests and
/// development builds without network access.
pub struct NoopEmbedder {
    dimension: usize,
}

impl NoopEmbedder {
    /// Create a new no-op embedder with the default dimension (1536).
    #[must_use]
    pub fn new() -> Self {
        Self { dimension: 1536 }
    }

    /// Create a new no-op embedder with a custom dimension.
    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for NoopEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for NoopEmbedder {
    fn model_name(&self) -> &str {
        "noop"
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|_| vec![0.0; self.dimension]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_model_name() {
        let embedder = NoopEmbedder::new();
        assert_eq!(embedder.model_name(), "noop");
    }

    #[tokio::test]
    async fn test_noop_embed() {
        let embedder = NoopEmbedder::with_dimension(8);
        let outputs = embedder.embed(&["hello", "world"]).await.unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].len(), 8);
        assert!(outputs[0].iter().all(|&v| v == 0.0));
    }

    #[tokio::test]
    async fn test_noop_embed_query() {
        let embedder = NoopEmbedder::with_dimension(4);
        let output = embedder.embed_query("query").await.unwrap();
        assert_eq!(output.len(), 4);
    }

    #[tokio::test]
    async fn test_noop_embed_empty() {
        let embedder = NoopEmbedder::new();
        let outputs = embedder.embed(&[]).await.unwrap();
        assert!(outputs.is_empty());
    }
}

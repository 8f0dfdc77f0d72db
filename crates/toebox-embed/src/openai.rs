//! OpenAI embeddings provider.

use async_openai::config::OpenAIConfig;
use async_openai::types::CreateEmbeddingRequestArgs;
use async_openai::Client;
use async_trait::async_trait;
use tracing::debug;

use toebox_core::{EmbedError, Embedder};

/// Embedder backed by the OpenAI embeddings API.
///
/// Reads the API key from the `OPENAI_API_KEY` environment variable by
/// default; use [`OpenAiEmbedder::with_api_key`] to supply one explicitly.
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbedder {
    /// Create an embedder for the given model, authenticating from the
    /// environment.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
        }
    }

    /// Create an embedder with an explicit API key.
    pub fn with_api_key(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let input: Vec<String> = texts.iter().map(|t| (*t).to_string()).collect();
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(input)
            .build()
            .map_err(|e| EmbedError::Provider(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| EmbedError::Inference(e.to_string()))?;

        debug!(
            "Embedded {} texts with {} ({} vectors returned)",
            texts.len(),
            self.model,
            response.data.len()
        );

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

//! Managed-remote vector store adapter.
//!
//! Speaks a minimal JSON REST protocol to a hosted vector service:
//! `POST /collections/{name}/upsert`, `POST /collections/{name}/search`,
//! `POST /collections/{name}/exists`, `POST /collections/{name}/delete`,
//! and `GET /collections/{name}/count`. The collection name is scoped by
//! the owner partition key, and the endpoint comes from the
//! `TOEBOX_VECTOR_URL` environment variable. Durability is the service's
//! concern, so `persist` is a no-op.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use toebox_core::{DocChunk, Embedder, ScoredDoc, StoreError, VectorStore};

const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Environment variable naming the remote vector service endpoint.
pub const ENDPOINT_ENV_VAR: &str = "TOEBOX_VECTOR_URL";

#[derive(Serialize)]
struct UpsertItem<'a> {
    doc: &'a DocChunk,
    embedding: &'a [f32],
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    items: Vec<UpsertItem<'a>>,
}

#[derive(Serialize)]
struct SearchRequest {
    embedding: Vec<f32>,
    k: usize,
}

#[derive(Deserialize)]
struct SearchHit {
    doc: DocChunk,
    score: f32,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

#[derive(Serialize)]
struct ExistsRequest<'a> {
    content_hash: &'a str,
}

#[derive(Deserialize)]
struct ExistsResponse {
    exists: bool,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    source: &'a str,
}

#[derive(Deserialize)]
struct DeleteResponse {
    deleted: u64,
}

#[derive(Deserialize)]
struct CountResponse {
    count: usize,
}

/// Vector store backed by a managed remote service.
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
    collection: String,
    embedder: Arc<dyn Embedder>,
}

impl RemoteStore {
    /// Connect to the endpoint named by `TOEBOX_VECTOR_URL`, falling back to
    /// a local default.
    pub fn from_env(embedder: Arc<dyn Embedder>, user_id: &str) -> Self {
        let base_url =
            std::env::var(ENDPOINT_ENV_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(embedder, base_url, user_id)
    }

    /// Connect to an explicit endpoint.
    pub fn new(embedder: Arc<dyn Embedder>, base_url: impl Into<String>, user_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: format!("toebox_{user_id}"),
            embedder,
        }
    }

    fn url(&self, operation: &str) -> String {
        format!("{}/collections/{}/{operation}", self.base_url, self.collection)
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        operation: &str,
        body: &Req,
    ) -> Result<Resp, StoreError> {
        let response = self
            .http
            .post(self.url(operation))
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
            .error_for_status()
            .map_err(|e| StoreError::Query(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

#[async_trait]
impl VectorStore for RemoteStore {
    async fn add_documents(&self, docs: &[DocChunk]) -> Result<(), StoreError> {
        if docs.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = docs.iter().map(|d| d.page_content.as_str()).collect();
        let embeddings = self
            .embedder
            .embed(&texts)
            .await
            .map_err(|e| StoreError::Insert(e.to_string()))?;

        let items: Vec<UpsertItem<'_>> = docs
            .iter()
            .zip(embeddings.iter())
            .map(|(doc, embedding)| UpsertItem {
                doc,
                embedding: embedding.as_slice(),
            })
            .collect();

        let _: serde_json::Value = self
            .post_json("upsert", &UpsertRequest { items })
            .await
            .map_err(|e| match e {
                StoreError::Query(message) => StoreError::Insert(message),
                other => other,
            })?;

        debug!("Upserted {} documents to {}", docs.len(), self.collection);
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDoc>, StoreError> {
        let embedding = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let response: SearchResponse =
            self.post_json("search", &SearchRequest { embedding, k }).await?;

        Ok(response
            .hits
            .into_iter()
            .map(|hit| ScoredDoc {
                doc: hit.doc,
                score: hit.score,
            })
            .collect())
    }

    async fn persist(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn contains_hash(&self, content_hash: &str) -> Result<bool, StoreError> {
        let response: ExistsResponse =
            self.post_json("exists", &ExistsRequest { content_hash }).await?;
        Ok(response.exists)
    }

    async fn delete_by_source(&self, source: &str) -> Result<u64, StoreError> {
        let response: DeleteResponse =
            self.post_json("delete", &DeleteRequest { source }).await?;
        Ok(response.deleted)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let response = self
            .http
            .get(self.url("count"))
            .send()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
            .error_for_status()
            .map_err(|e| StoreError::Query(e.to_string()))?;
        let count: CountResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(count.count)
    }
}

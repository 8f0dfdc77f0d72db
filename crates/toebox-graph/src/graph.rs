//! The pipeline itself.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use toebox_core::{
    ChatMessage, ChatModel, Embedder, Error, Result, RunConfig, StoreError,
};
use toebox_embed::resolve_embedder;
use toebox_ingest::open_retriever_with;
use toebox_llm::resolve_chat_model;
use toebox_query::{ShoeQueryTranslator, SqliteCatalog};
use toebox_retrieve::RetrieveOptions;

use crate::format::{format_docs, format_shoe_data};
use crate::routing::{should_lookup_shoes, should_retrieve_docs};
use crate::state::{ConversationState, QueryUpdate};

/// The fixed-topology shoe assistant pipeline.
///
/// Holds the per-request configuration snapshot and the resolved
/// capabilities; each `run` drives one conversational turn through
/// `fetch_shoe_data → generate_query → retrieve → respond`, with routing
/// deciding which optional steps run.
pub struct ShoeGraph {
    config: RunConfig,
    catalog: Arc<SqliteCatalog>,
    query_model: Arc<dyn ChatModel>,
    response_model: Arc<dyn ChatModel>,
    embedder: Arc<dyn Embedder>,
    retrieve_options: RetrieveOptions,
}

impl ShoeGraph {
    /// Build a graph, resolving models and embedder from the configuration.
    pub fn new(config: RunConfig, catalog: Arc<SqliteCatalog>) -> Result<Self> {
        let query_model = resolve_chat_model(&config.query_model)?;
        let response_model = resolve_chat_model(&config.response_model)?;
        let embedder = resolve_embedder(&config.embedding_model)?;
        Ok(Self::with_capabilities(
            config,
            catalog,
            query_model,
            response_model,
            embedder,
        ))
    }

    /// Build a graph with explicit capabilities.
    pub fn with_capabilities(
        config: RunConfig,
        catalog: Arc<SqliteCatalog>,
        query_model: Arc<dyn ChatModel>,
        response_model: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            config,
            catalog,
            query_model,
            response_model,
            embedder,
            retrieve_options: RetrieveOptions::default(),
        }
    }

    /// Drive one conversational turn.
    ///
    /// The conversation must hold at least one message. Exactly one
    /// assistant message is appended on success.
    pub async fn run(&self, state: &mut ConversationState) -> Result<()> {
        if state.messages.is_empty() {
            return Err(Error::Other(
                "conversation has no messages to respond to".to_string(),
            ));
        }

        if should_lookup_shoes(self.query_model.as_ref(), state).await {
            self.fetch_shoe_data(state).await?;
            if should_retrieve_docs(self.query_model.as_ref(), state).await {
                self.generate_query(state).await?;
                self.retrieve(state).await?;
            }
        } else {
            self.generate_query(state).await?;
            self.retrieve(state).await?;
        }

        self.respond(state).await
    }

    /// Translate the last user message into structured conditions and fetch
    /// matching shoes.
    async fn fetch_shoe_data(&self, state: &mut ConversationState) -> Result<()> {
        let Some(message) = state.last_user_message() else {
            state.replace_relevant_shoes(vec![]);
            return Ok(());
        };
        let query = message.content.clone();
        info!("Fetching shoe data for user message: {query}");

        let translator = ShoeQueryTranslator::new(Arc::clone(&self.response_model));
        let shoes = translator
            .fetch_matching_shoes(&self.catalog, &query)
            .await
            .map_err(Error::Catalog)?;

        info!("Found {} relevant shoes", shoes.len());
        state.replace_relevant_shoes(shoes);
        Ok(())
    }

    /// Formulate a document search query from the conversation.
    ///
    /// An unusable structured reply degrades to the raw user text rather
    /// than failing the turn.
    async fn generate_query(&self, state: &mut ConversationState) -> Result<()> {
        // On the opening turn the sole user message seeds the query list
        // used for prompt context
        let mut queries = state.queries.clone();
        if queries.is_empty() && state.messages.len() == 1 {
            queries.push(state.messages[0].content.clone());
        }

        let system = self
            .config
            .query_system_prompt_template
            .replace("{queries}", &queries.join("\n- "))
            .replace("{systemTime}", &Utc::now().to_rfc3339())
            .replace("{shoes}", &format_shoe_data(&state.relevant_shoes));

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(state.messages.iter().cloned());

        let generated = match self.query_model.complete_structured(&messages).await {
            Ok(value) => value
                .get("query")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            Err(e) => {
                warn!("Query generation failed: {e}");
                None
            }
        };

        let query = match generated {
            Some(query) => query,
            None => {
                // Best-effort fallback: search with the user's own words
                let fallback = state
                    .last_user_message()
                    .or_else(|| state.last_message())
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                warn!("Using raw message text as search query");
                fallback
            }
        };

        state.append_queries(QueryUpdate::Single(query));
        Ok(())
    }

    /// Retrieve documents for the latest query.
    ///
    /// A store that was never ingested is a hard error; any other
    /// retrieval failure degrades to an empty result set.
    async fn retrieve(&self, state: &mut ConversationState) -> Result<()> {
        let Some(query) = state.queries.last().cloned() else {
            state.replace_retrieved_docs(vec![]);
            return Ok(());
        };

        let store = match open_retriever_with(&self.config, Arc::clone(&self.embedder)).await {
            Ok(store) => store,
            Err(Error::Store(StoreError::NotIngested)) => {
                return Err(Error::Store(StoreError::NotIngested));
            }
            Err(e) => {
                warn!("Could not open retriever, continuing without documents: {e}");
                state.replace_retrieved_docs(vec![]);
                return Ok(());
            }
        };

        match toebox_retrieve::retrieve(
            store.as_ref(),
            &query,
            &self.retrieve_options,
            self.config.recency_weight,
        )
        .await
        {
            Ok(docs) => {
                info!("Retrieved {} documents for query: {query}", docs.len());
                state.replace_retrieved_docs(docs);
            }
            Err(e) => {
                warn!("Retrieval failed, continuing without documents: {e}");
                state.replace_retrieved_docs(vec![]);
            }
        }
        Ok(())
    }

    /// Compose the answer and append it to the conversation.
    async fn respond(&self, state: &mut ConversationState) -> Result<()> {
        let system = self
            .config
            .response_system_prompt_template
            .replace("{retrievedDocs}", &format_docs(&state.retrieved_docs))
            .replace("{systemTime}", &Utc::now().to_rfc3339())
            .replace("{shoes}", &format_shoe_data(&state.relevant_shoes));

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(state.messages.iter().cloned());

        let reply = self
            .response_model
            .complete(&messages)
            .await
            .map_err(Error::Llm)?;

        state.append_messages([ChatMessage::assistant(reply)]);
        Ok(())
    }
}

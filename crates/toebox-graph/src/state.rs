//! Conversation state shared between pipeline nodes.
//!
//! `messages` and `queries` are append-only: updates concatenate onto what
//! is already there. `relevant_shoes` and `retrieved_docs` hold the most
//! recent run's results and are replaced wholesale each time.

use toebox_core::{ChatMessage, Role, ScoredDoc, ShoeRecord};

/// A queries update: a single query or a batch.
#[derive(Debug, Clone)]
pub enum QueryUpdate {
    Single(String),
    Batch(Vec<String>),
}

/// Accumulated state carried between pipeline steps.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Ordered conversation turns; append-only
    pub messages: Vec<ChatMessage>,
    /// Search queries generated so far; append-only
    pub queries: Vec<String>,
    /// Most recent structured-filter result set; replaced each run
    pub relevant_shoes: Vec<ShoeRecord>,
    /// Most recent similarity-search result set; replaced each run
    pub retrieved_docs: Vec<ScoredDoc>,
}

impl ConversationState {
    /// Start a conversation from the given turns.
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Append new turns to the conversation.
    pub fn append_messages(&mut self, new: impl IntoIterator<Item = ChatMessage>) {
        self.messages.extend(new);
    }

    /// Append one query or a batch of queries.
    pub fn append_queries(&mut self, update: QueryUpdate) {
        match update {
            QueryUpdate::Single(query) => self.queries.push(query),
            QueryUpdate::Batch(queries) => self.queries.extend(queries),
        }
    }

    /// Replace the structured-filter results.
    pub fn replace_relevant_shoes(&mut self, shoes: Vec<ShoeRecord>) {
        self.relevant_shoes = shoes;
    }

    /// Replace the similarity-search results.
    pub fn replace_retrieved_docs(&mut self, docs: Vec<ScoredDoc>) {
        self.retrieved_docs = docs;
    }

    /// The most recent turn.
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The most recent turn, only when it is user-authored.
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages.last().filter(|m| m.role == Role::User)
    }
}

//! Model-backed query translation with a keyword fallback.
//!
//! The happy path asks the structured-output capability for a
//! [`ShoeSearchConditions`] value and validates the reply against the
//! schema. Any failure — the call itself, malformed output, a schema
//! mismatch, even the structured query's execution — drops to naive
//! keyword extraction over the same field set, so the end user never sees
//! a translation error.

use std::sync::Arc;
use tracing::{debug, warn};

use toebox_core::{CatalogError, ChatMessage, ChatModel, ShoeRecord, TranslateError};

use crate::builder::{build_fallback_query, build_query};
use crate::catalog::SqliteCatalog;
use crate::conditions::ShoeSearchConditions;

/// System prompt for extracting search conditions from a user question.
const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are a shoe search assistant that converts natural language queries into structured search parameters.
Your task is to extract search conditions from the user's query about shoes.

Available shoe attributes - if an attribute is not relevant to the query, return \"empty\" for its value:
- stackHeightMm: the height of the shoe's sole in millimeters. Matches shoes where either the forefoot or heel stack height is within the specified range.
- drop: the difference between heel and forefoot stack heights.
- width: the width of the shoe (narrow, standard, wide)
- intendedUse: what the shoe is designed for (road, trail, race, etc.)
- gender: the gender the shoe is designed for (men, women, unisex)

Examples:
- \"Show me shoes with zero drop\" -> drop.min = 0, drop.max = 0
- \"What are the highest stack height shoes?\" -> stackHeightMm.sort = \"desc\"
- \"Find trail running shoes\" -> intendedUse = \"trail\"
- \"Show me women's shoes with stack height under 20mm\" -> gender = \"women\", stackHeightMm.max = 20
- \"What are the lowest stack height shoes?\" -> stackHeightMm.sort = \"asc\"

Extract only the parameters that are explicitly mentioned or implied in the query.
Respond with a single JSON object.";

/// Words too generic to be useful fallback keywords.
const STOPWORDS: [&str; 11] = [
    "what", "which", "where", "when", "how", "that", "this", "with", "from", "have", "your",
];

/// Translates free-text shoe questions into catalog queries.
pub struct ShoeQueryTranslator {
    model: Arc<dyn ChatModel>,
}

impl ShoeQueryTranslator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Ask the structured-output capability for search conditions and
    /// validate the reply against the schema.
    pub async fn translate(
        &self,
        query_text: &str,
    ) -> Result<ShoeSearchConditions, TranslateError> {
        let messages = [
            ChatMessage::system(EXTRACTION_SYSTEM_PROMPT),
            ChatMessage::user(query_text),
        ];
        let value = self.model.complete_structured(&messages).await?;
        serde_json::from_value(value).map_err(|e| TranslateError::Schema(e.to_string()))
    }

    /// Naive keyword extraction: strip stopwords and short tokens.
    pub fn fallback_keywords(query_text: &str) -> Vec<String> {
        query_text
            .to_lowercase()
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|word| word.len() > 3 && !STOPWORDS.contains(&word.as_str()))
            .collect()
    }

    /// Fetch the shoes matching a user question.
    ///
    /// Translation or structured-query failures fall back to OR-matched
    /// keywords; only a fallback-path catalog failure propagates.
    pub async fn fetch_matching_shoes(
        &self,
        catalog: &SqliteCatalog,
        query_text: &str,
    ) -> Result<Vec<ShoeRecord>, CatalogError> {
        match self.translate(query_text).await {
            Ok(conditions) => {
                debug!("Parsed search conditions: {conditions:?}");
                match catalog.execute(&build_query(&conditions)) {
                    Ok(shoes) => return Ok(shoes),
                    Err(e) => {
                        warn!("Structured shoe query failed: {e}");
                    }
                }
            }
            Err(e) => {
                warn!("Error parsing natural language query: {e}");
            }
        }

        let keywords = Self::fallback_keywords(query_text);
        debug!("Falling back to keyword search: {keywords:?}");
        catalog.execute(&build_fallback_query(&keywords))
    }
}

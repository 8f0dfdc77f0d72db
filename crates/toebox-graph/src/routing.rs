//! Routing decisions.
//!
//! Both decisions only ever take the optional step for a user-authored
//! last turn with an explicit "YES" from the classifier; an error or an
//! ambiguous reply takes the cheaper path.

use tracing::warn;

use toebox_core::{ChatMessage, ChatModel};

use crate::format::format_shoe_data;
use crate::state::ConversationState;

const LOOKUP_ROUTING_PROMPT: &str = "\
You are a shoe search assistant that determines if a query should look in a \
database for shoe specifications or not.

A query likely requires shoe specifications if it mentions an aspect of the \
shoe like drop, stack height, etc. It does not require shoe specifications \
if it is a general question like \"What's the most durable shoe?\".

If the query requires shoe data, respond with \"YES\". If the query is a \
general question that could be better answered by other means, respond with \
\"NO\".";

const RETRIEVE_ROUTING_PROMPT: &str = "\
You are a shoe search assistant that determines if a query requires a search \
of shoe review documents or not.

A shoe data look up has already been performed and the following information \
is available:
{shoes}

If the query requires a search of shoe review documents, respond with \
\"YES\". If the query is answered with the shoe data already present, \
respond with \"NO\".";

/// Whether the pipeline should fetch structured shoe data.
pub async fn should_lookup_shoes(model: &dyn ChatModel, state: &ConversationState) -> bool {
    if state.last_user_message().is_none() {
        return false;
    }

    let mut messages = vec![ChatMessage::system(LOOKUP_ROUTING_PROMPT)];
    messages.extend(state.messages.iter().cloned());

    match model.complete(&messages).await {
        Ok(reply) => reply.trim().eq_ignore_ascii_case("yes"),
        Err(e) => {
            warn!("Shoe lookup routing failed, skipping lookup: {e}");
            false
        }
    }
}

/// Whether the pipeline should retrieve review documents, given the shoe
/// data already fetched.
pub async fn should_retrieve_docs(model: &dyn ChatModel, state: &ConversationState) -> bool {
    let Some(last) = state.last_user_message() else {
        return false;
    };

    let system =
        RETRIEVE_ROUTING_PROMPT.replace("{shoes}", &format_shoe_data(&state.relevant_shoes));
    let messages = vec![ChatMessage::system(system), last.clone()];

    match model.complete(&messages).await {
        Ok(reply) => reply.trim().eq_ignore_ascii_case("yes"),
        Err(e) => {
            warn!("Document retrieval routing failed, skipping retrieval: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use toebox_core::ChatMessage;
    use toebox_llm::ScriptedChatModel;

    fn user_state(text: &str) -> ConversationState {
        ConversationState::new(vec![ChatMessage::user(text)])
    }

    #[tokio::test]
    async fn test_lookup_yes() {
        let model = ScriptedChatModel::with_replies(["YES"]);
        assert!(should_lookup_shoes(&model, &user_state("zero drop shoes?")).await);
    }

    #[tokio::test]
    async fn test_lookup_no() {
        let model = ScriptedChatModel::with_replies(["NO"]);
        assert!(!should_lookup_shoes(&model, &user_state("most durable shoe?")).await);
    }

    #[tokio::test]
    async fn test_lookup_skipped_for_assistant_turn() {
        let model = ScriptedChatModel::with_replies(["YES"]);
        let state = ConversationState::new(vec![ChatMessage::assistant("here you go")]);
        assert!(!should_lookup_shoes(&model, &state).await);
    }

    #[tokio::test]
    async fn test_lookup_ambiguous_reply_skips() {
        let model = ScriptedChatModel::with_replies(["Maybe, it depends"]);
        assert!(!should_lookup_shoes(&model, &user_state("hmm")).await);
    }

    #[tokio::test]
    async fn test_lookup_error_skips() {
        let model = ScriptedChatModel::with_replies(Vec::<String>::new());
        assert!(!should_lookup_shoes(&model, &user_state("hello")).await);
    }

    #[tokio::test]
    async fn test_retrieve_yes_case_insensitive() {
        let model = ScriptedChatModel::with_replies(["yes"]);
        assert!(should_retrieve_docs(&model, &user_state("how do they feel?")).await);
    }

    #[tokio::test]
    async fn test_retrieve_no() {
        let model = ScriptedChatModel::with_replies(["NO"]);
        assert!(!should_retrieve_docs(&model, &user_state("list the specs")).await);
    }

    #[tokio::test]
    async fn test_retrieve_skipped_for_assistant_turn() {
        let model = ScriptedChatModel::with_replies(["YES"]);
        let state = ConversationState::new(vec![ChatMessage::assistant("done")]);
        assert!(!should_retrieve_docs(&model, &state).await);
    }

    #[tokio::test]
    async fn test_arc_model_usable() {
        let model: Arc<dyn ChatModel> = Arc::new(ScriptedChatModel::with_replies(["YES"]));
        assert!(should_lookup_shoes(model.as_ref(), &user_state("drop?")).await);
    }
}

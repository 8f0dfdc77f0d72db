//! Canned-reply chat model for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use toebox_core::{ChatMessage, ChatModel, LlmError};

/// Chat model that replays a fixed script of replies, one per call.
///
/// Useful for exercising the orchestrator and the query translator without
/// a provider account. Structured calls parse the next scripted reply as
/// JSON, so a reply of `not json` exercises the malformed-output path.
pub struct ScriptedChatModel {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedChatModel {
    /// Create a model that replays the given replies in order.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }

    fn next_reply(&self) -> Result<String, LlmError> {
        self.replies
            .lock()
            .expect("scripted replies lock poisoned")
            .pop_front()
            .ok_or_else(|| LlmError::Request("no scripted reply left".to_string()))
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.next_reply()
    }

    async fn complete_structured(
        &self,
        _messages: &[ChatMessage],
    ) -> Result<serde_json::Value, LlmError> {
        let text = self.next_reply()?;
        serde_json::from_str(&text).map_err(|e| LlmError::Malformed(e.to_string()))
    }
}

//! # toebox-llm
//!
//! Chat-model resolution for toebox.
//!
//! Model identifiers have the form `provider/model`; a bare model name
//! assumes the `openai` provider. The [`ChatModel`](toebox_core::ChatModel)
//! trait exposes plain completion and JSON-constrained completion; schema
//! validation of the JSON value is the caller's responsibility.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`OpenAiChatModel`] | OpenAI chat completions client |
//! | [`ScriptedChatModel`] | Canned-reply model for tests |

pub mod openai;
pub mod scripted;

pub use openai::OpenAiChatModel;
pub use scripted::ScriptedChatModel;

use std::sync::Arc;
use toebox_core::{ChatModel, Error};

/// Split a `provider/model` identifier, defaulting the provider to `openai`.
fn split_identifier(name: &str) -> (&str, &str) {
    match name.find('/') {
        None => ("openai", name),
        Some(index) => (&name[..index], &name[index + 1..]),
    }
}

/// Load a chat model from a fully specified name.
pub fn resolve_chat_model(model_identifier: &str) -> Result<Arc<dyn ChatModel>, Error> {
    let (provider, model) = split_identifier(model_identifier);
    match provider {
        "openai" => Ok(Arc::new(OpenAiChatModel::new(model))),
        other => Err(Error::Config(format!("unsupported chat provider: {other}"))),
    }
}

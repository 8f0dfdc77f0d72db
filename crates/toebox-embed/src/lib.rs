//! # toebox-embed
//!
//! Embedding-provider resolution for toebox.
//!
//! A model identifier has the form `provider/model`; when no provider is
//! given, `openai` is assumed. Unknown providers fail with a configuration
//! error naming the provider.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`OpenAiEmbedder`] | OpenAI embeddings API client |
//! | [`NoopEmbedder`] | Zero-vector embedder for testing and development |

pub mod noop;
pub mod openai;

pub use noop::NoopEmbedder;
pub use openai::OpenAiEmbedder;

use std::sync::Arc;
use toebox_core::{Embedder, Error};

/// Split a `provider/model` identifier, defaulting the provider to `openai`.
pub(crate) fn split_identifier(name: &str) -> (&str, &str) {
    match name.find('/') {
        None => ("openai", name),
        Some(index) => (&name[..index], &name[index + 1..]),
    }
}

/// Connect to the configured text encoder.
pub fn resolve_embedder(model_identifier: &str) -> Result<Arc<dyn Embedder>, Error> {
    let (provider, model) = split_identifier(model_identifier);
    match provider {
        "openai" => Ok(Arc::new(OpenAiEmbedder::new(model))),
        other => Err(Error::Config(format!(
            "unsupported embedding provider: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_identifier_with_provider() {
        assert_eq!(
            split_identifier("openai/text-embedding-3-small"),
            ("openai", "text-embedding-3-small")
        );
    }

    #[test]
    fn test_split_identifier_without_provider() {
        assert_eq!(
            split_identifier("text-embedding-3-small"),
            ("openai", "text-embedding-3-small")
        );
    }

    #[test]
    fn test_resolve_openai() {
        let embedder = resolve_embedder("openai/text-embedding-3-small").unwrap();
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
    }

    #[test]
    fn test_resolve_bare_model_defaults_to_openai() {
        let embedder = resolve_embedder("text-embedding-3-large").unwrap();
        assert_eq!(embedder.model_name(), "text-embedding-3-large");
    }

    #[test]
    fn test_resolve_unknown_provider() {
        let err = resolve_embedder("cohere/embed-v3").unwrap_err();
        match err {
            Error::Config(message) => {
                assert!(message.contains("cohere"), "should name the provider");
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}

//! OpenAI chat completions provider.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::debug;

use toebox_core::{ChatMessage, ChatModel, LlmError, Role};

/// Chat model backed by the OpenAI completions API.
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatModel {
    /// Create a model handle authenticating from the environment.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
        }
    }

    /// Create a model handle with an explicit API key.
    pub fn with_api_key(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }

    fn convert_messages(
        messages: &[ChatMessage],
    ) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
        messages
            .iter()
            .map(|message| {
                let converted: ChatCompletionRequestMessage = match message.role {
                    Role::System => ChatCompletionRequestSystemMessageArgs::default()
                        .content(message.content.as_str())
                        .build()
                        .map_err(|e| LlmError::Request(e.to_string()))?
                        .into(),
                    Role::User => ChatCompletionRequestUserMessageArgs::default()
                        .content(message.content.as_str())
                        .build()
                        .map_err(|e| LlmError::Request(e.to_string()))?
                        .into(),
                    Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                        .content(message.content.as_str())
                        .build()
                        .map_err(|e| LlmError::Request(e.to_string()))?
                        .into(),
                };
                Ok(converted)
            })
            .collect()
    }

    async fn create(
        &self,
        messages: &[ChatMessage],
        json_mode: bool,
    ) -> Result<String, LlmError> {
        let converted = Self::convert_messages(messages)?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(converted);
        if json_mode {
            builder.response_format(ResponseFormat::JsonObject);
        }
        let request = builder
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        debug!("Chat completion from {} returned", self.model);

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::Malformed("no completion choices returned".to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.create(messages, false).await
    }

    async fn complete_structured(
        &self,
        messages: &[ChatMessage],
    ) -> Result<serde_json::Value, LlmError> {
        let text = self.create(messages, true).await?;
        serde_json::from_str(&text).map_err(|e| LlmError::Malformed(e.to_string()))
    }
}

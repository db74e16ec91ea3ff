//! services/editor/src/adapters/completion_llm.rs
//!
//! This module contains the adapter for the AI editing assistant.
//! It implements the `CompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use retro_editor_core::ports::{CompletionService, PortError, PortResult};
use tracing::debug;

const SYSTEM_INSTRUCTIONS: &str = "You are the assistant built into a retro text editor. \
You receive the user's whole document and an instruction. Apply the instruction and respond \
with ONLY the resulting text, with no explanations, no preamble and no markdown code fences \
around it. If there is nothing sensible to return, respond with an empty message.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible chat model.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn user_message(document: &str, instruction: &str) -> String {
    format!(
        "DOCUMENT:\n---\n{}\n---\n\nINSTRUCTION:\n{}",
        document,
        instruction.trim()
    )
}

/// Rejected keys become `Unauthorized` so the session can name the likely cause.
fn map_openai_error(e: OpenAIError) -> PortError {
    match e {
        OpenAIError::ApiError(ref api) if api.message.contains("API key") => PortError::Unauthorized,
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    async fn complete(&self, document: &str, instruction: &str) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message(document, instruction))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        // No choices or no text both mean "nothing to apply".
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        debug!(chars = text.len(), "Completion received.");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_carries_document_and_trimmed_instruction() {
        let message = user_message("hello\nworld", "  uppercase it \n");
        assert_eq!(
            message,
            "DOCUMENT:\n---\nhello\nworld\n---\n\nINSTRUCTION:\nuppercase it"
        );
    }

    #[test]
    fn transport_errors_stay_unexpected() {
        let err = map_openai_error(OpenAIError::InvalidArgument("bad".to_string()));
        assert!(matches!(err, PortError::Unexpected(_)));
    }
}

//! services/api/src/adapters/llm.rs
//!
//! This module contains the adapter for the generative language model used to write
//! and grade flashcards. It talks to any OpenAI-compatible chat completions endpoint
//! (Gemini exposes one) and implements the `TextGenerationService` port.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use study_cards_core::ports::{PortError, PortResult, TextGenerationService};
use tracing::debug;

use super::provider_error;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTextAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiTextAdapter {
    /// Creates a new `OpenAiTextAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for OpenAiTextAdapter {
    /// Sends the prompt as a single user message and returns the first choice's text.
    async fn generate_text(&self, prompt: &str) -> PortResult<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let messages: Vec<ChatCompletionRequestMessage> = vec![message.into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending prompt to LLM");

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Network(format!("LLM call timed out after {:?}", self.timeout))
            })?
            .map_err(provider_error)?;

        // Extract the text content from the first choice in the response.
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(PortError::Unexpected(
                "LLM returned no choices in its response.".to_string(),
            ));
        };
        choice.message.content.ok_or_else(|| {
            PortError::Unexpected("LLM response contained no text content.".to_string())
        })
    }
}

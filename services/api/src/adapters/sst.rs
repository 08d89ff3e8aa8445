//! services/api/src/adapters/sst.rs
//!
//! This module contains the adapter for OpenAI's Speech-to-Text (Whisper) service.
//! It implements the `SpeechToTextService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::audio::{AudioInput, AudioResponseFormat, CreateTranscriptionRequest},
    Client,
};
use async_trait::async_trait;
use std::path::Path;
use study_cards_core::ports::{PortError, PortResult, SpeechToTextService};

use super::provider_error;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SpeechToTextService` port using the OpenAI Whisper API.
#[derive(Clone)]
pub struct OpenAiSstAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSstAdapter {
    /// Creates a new `OpenAiSstAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `SpeechToTextService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SpeechToTextService for OpenAiSstAdapter {
    /// Uploads the file and returns the text of every segment Whisper reports.
    async fn transcribe_file(&self, path: &Path) -> PortResult<Vec<String>> {
        let audio = tokio::fs::read(path)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to read audio file: {}", e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.wav".to_string());

        let request = CreateTranscriptionRequest {
            file: AudioInput::from_vec_u8(file_name, audio),
            model: self.model.clone(),
            response_format: Some(AudioResponseFormat::VerboseJson),
            ..Default::default()
        };

        let response = self
            .client
            .audio()
            .transcription()
            .create_verbose_json(request)
            .await
            .map_err(provider_error)?;

        // Older models may omit segments; fall back to the flat text.
        match response.segments {
            Some(segments) if !segments.is_empty() => {
                Ok(segments.into_iter().map(|s| s.text).collect())
            }
            _ => Ok(vec![response.text]),
        }
    }
}

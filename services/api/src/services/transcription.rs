//! services/api/src/services/transcription.rs
//!
//! Turns an uploaded audio blob into a transcript via the `SpeechToTextService` port.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use study_cards_core::ports::SpeechToTextService;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("Speech-to-text provider is not configured.")]
    ProviderUnavailable,
    #[error("Could not transcribe audio")]
    EmptyTranscript,
    #[error("Transcription error: {0}")]
    Failed(String),
}

pub struct TranscriptionService {
    stt: Option<Arc<dyn SpeechToTextService>>,
}

impl TranscriptionService {
    pub fn new(stt: Option<Arc<dyn SpeechToTextService>>) -> Self {
        Self { stt }
    }

    /// Transcribes `audio`, joining the recognized segments with single spaces.
    ///
    /// The upload is staged in a temporary file named after `file_name`'s extension
    /// (`.wav` when there is none); the file is removed before this returns.
    pub async fn transcribe(
        &self,
        audio: &[u8],
        file_name: Option<&str>,
    ) -> Result<String, TranscriptionError> {
        let stt = self
            .stt
            .as_ref()
            .ok_or(TranscriptionError::ProviderUnavailable)?;

        let suffix = upload_suffix(file_name);
        let mut staged = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| TranscriptionError::Failed(e.to_string()))?;
        staged
            .write_all(audio)
            .and_then(|_| staged.flush())
            .map_err(|e| TranscriptionError::Failed(e.to_string()))?;

        let segments = stt.transcribe_file(staged.path()).await.map_err(|e| {
            error!("Speech-to-text call failed: {}", e);
            TranscriptionError::Failed(e.to_string())
        })?;

        let transcript = join_segments(&segments);
        if transcript.is_empty() {
            return Err(TranscriptionError::EmptyTranscript);
        }

        info!(
            segments = segments.len(),
            chars = transcript.len(),
            "Transcribed audio upload"
        );
        Ok(transcript)
    }
}

fn upload_suffix(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| ".wav".to_string())
}

fn join_segments(segments: &[String]) -> String {
    segments
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

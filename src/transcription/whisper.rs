//! Whisper transcription over an OpenAI-compatible API.

use super::Transcriber;
use crate::error::{RecapError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
}

impl WhisperTranscriber {
    /// Create a transcriber using `model` (e.g. `whisper-large-v3`).
    pub fn new(client: Client<OpenAIConfig>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self, audio), fields(model = %self.model, bytes = audio.len()))]
    async fn transcribe(&self, file_name: &str, audio: Vec<u8>) -> Result<String> {
        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(file_name.to_string(), audio))
            .model(&self.model)
            .build()
            .map_err(|e| RecapError::TranscriptionFailed(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| RecapError::TranscriptionFailed(format!("Speech-to-text API error: {}", e)))?;

        let text = response.text.trim().to_string();
        debug!("Transcribed {} characters", text.len());
        Ok(text)
    }
}

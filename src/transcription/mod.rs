//! Speech-to-text transcription.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::audio::AudioArtifact;
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe raw audio bytes into plain text.
    async fn transcribe(&self, file_name: &str, audio: Vec<u8>) -> Result<String>;
}

/// Load an artifact, transcribe it and delete it once the text is in hand.
///
/// On failure the artifact is left for the caller's cleanup.
#[instrument(skip_all, fields(audio = %artifact.path().display()))]
pub async fn transcribe_artifact(
    transcriber: &dyn Transcriber,
    artifact: &AudioArtifact,
) -> Result<String> {
    let audio = artifact.read().await.map_err(|e| {
        RecapError::TranscriptionFailed(format!("Cannot read audio artifact: {e}"))
    })?;

    if audio.is_empty() {
        return Err(RecapError::TranscriptionFailed("Audio artifact is empty".into()));
    }

    debug!("Submitting {} bytes for transcription", audio.len());
    let text = transcriber.transcribe(artifact.file_name(), audio).await?;

    if let Err(e) = artifact.delete().await {
        warn!("Failed to delete transcribed audio: {}", e);
    }

    Ok(text)
}

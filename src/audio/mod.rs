//! Audio extraction.
//!
//! An [`AudioExtractor`] turns a video URL into an [`AudioArtifact`]: a
//! request-scoped file that is removed once transcription no longer needs it.

mod downloader;

pub use downloader::YtDlpExtractor;

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Trait for audio extraction backends.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Fetch the audio track of `url` into a fresh, uniquely named file.
    async fn extract(&self, url: &str) -> Result<AudioArtifact>;

    /// Release whatever a request produced. Called once per request, with
    /// `None` when extraction never yielded an artifact.
    async fn cleanup(&self, artifact: Option<AudioArtifact>) -> Result<()> {
        if let Some(artifact) = artifact {
            artifact.delete().await?;
        }
        Ok(())
    }
}

/// A transient audio file owned by a single pipeline invocation.
///
/// Deletion is idempotent: the file is removed at most once no matter how
/// many times [`AudioArtifact::delete`] is called, and dropping an artifact
/// that was never deleted removes it.
#[derive(Debug)]
pub struct AudioArtifact {
    path: PathBuf,
    deleted: AtomicBool,
}

impl AudioArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            deleted: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name sent along with the bytes to the speech-to-text API.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::SeqCst)
    }

    /// Load the raw audio bytes.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    /// Remove the file. Returns `true` only for the call that removed it.
    pub async fn delete(&self) -> Result<bool> {
        if self.deleted.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Deleted audio artifact {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                // Leave it retryable
                self.deleted.store(false, Ordering::SeqCst);
                Err(e.into())
            }
        }
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        if self.deleted.swap(true, Ordering::SeqCst) {
            return;
        }
        // No runtime to await on here
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Dropped audio artifact {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to delete audio artifact {}: {}", self.path.display(), e),
        }
    }
}

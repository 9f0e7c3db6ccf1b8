//! yt-dlp based audio extraction.

use super::{AudioArtifact, AudioExtractor};
use crate::config::ExtractionSettings;
use crate::error::{RecapError, Result, Stage};
use crate::request::video_id;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Extracts audio by shelling out to yt-dlp.
pub struct YtDlpExtractor {
    binary: String,
    output_dir: PathBuf,
    audio_format: String,
    timeout: Duration,
}

impl YtDlpExtractor {
    /// Create an extractor writing into `output_dir`.
    pub fn with_config(output_dir: impl Into<PathBuf>, settings: &ExtractionSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            output_dir: output_dir.into(),
            audio_format: settings.audio_format.clone(),
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
    }

    async fn run_downloader(&self, url: &str, template: &Path) -> Result<()> {
        let child = Command::new(&self.binary)
            .arg("--extract-audio")
            .arg("--audio-format").arg(&self.audio_format)
            .arg("--output").arg(template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(o)) => o,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecapError::ToolNotFound(self.binary.clone()));
            }
            Ok(Err(e)) => {
                return Err(RecapError::ExtractionFailed(format!(
                    "{} execution failed: {e}",
                    self.binary
                )));
            }
            Err(_) => {
                return Err(RecapError::Timeout {
                    stage: Stage::Extracting,
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecapError::ExtractionFailed(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl AudioExtractor for YtDlpExtractor {
    #[instrument(skip(self), fields(url = %url))]
    async fn extract(&self, url: &str) -> Result<AudioArtifact> {
        tokio::fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            RecapError::ExtractionFailed(format!(
                "Cannot create {}: {e}",
                self.output_dir.display()
            ))
        })?;

        let stem = artifact_stem(url);
        let template = self.output_dir.join(format!("{}.%(ext)s", stem));

        // Armed until the artifact is handed out; covers errors and cancellation
        let guard = PartialDownload::new(&self.output_dir, &stem);

        info!("Downloading audio to {}", self.output_dir.display());
        self.run_downloader(url, &template).await?;
        let path = find_audio_file(&self.output_dir, &stem, &self.audio_format).await?;

        guard.disarm();
        debug!("Audio extracted to {}", path.display());
        Ok(AudioArtifact::new(path))
    }
}

/// Removes every file for a stem when dropped, unless disarmed.
struct PartialDownload<'a> {
    dir: &'a Path,
    stem: &'a str,
    armed: bool,
}

impl<'a> PartialDownload<'a> {
    fn new(dir: &'a Path, stem: &'a str) -> Self {
        Self { dir, stem, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialDownload<'_> {
    fn drop(&mut self) {
        if self.armed {
            remove_partials(self.dir, self.stem);
        }
    }
}

/// Unique file stem for one extraction, so concurrent requests for the same
/// video never share a path.
pub(crate) fn artifact_stem(url: &str) -> String {
    let id = video_id(url).unwrap_or_else(|| "video".to_string());
    format!("{}-{}", id, Uuid::new_v4().simple())
}

/// Locates the file yt-dlp produced for `stem`.
async fn find_audio_file(dir: &Path, stem: &str, preferred_ext: &str) -> Result<PathBuf> {
    let read_err = |e: std::io::Error| {
        RecapError::ExtractionFailed(format!("Cannot read {}: {e}", dir.display()))
    };

    let preferred = dir.join(format!("{}.{}", stem, preferred_ext));
    if tokio::fs::try_exists(&preferred).await.map_err(read_err)? {
        return Ok(preferred);
    }

    // Post-processing may be skipped, leaving the original container
    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(stem) && !name.ends_with(".part") {
            return Ok(entry.path());
        }
    }

    Err(RecapError::ExtractionFailed("Audio file not found after download".into()))
}

/// Removes anything an unfinished download left behind for `stem`.
///
/// Synchronous because it runs from `Drop`.
fn remove_partials(dir: &Path, stem: &str) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().starts_with(stem) {
            if let Err(e) = std::fs::remove_file(entry.path()) {
                warn!("Failed to remove partial download {}: {}", entry.path().display(), e);
            }
        }
    }
}

//! Error types for Recap.

use std::fmt;
use thiserror::Error;

/// Message returned to callers for a rejected video URL.
pub const INVALID_URL_MESSAGE: &str = "Invalid YouTube URL";

/// Message returned to callers for any failure past validation.
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process video";

/// A phase of the digest pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Extracting,
    Transcribing,
    FetchingMetadata,
    Summarizing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Validating => write!(f, "validating"),
            Stage::Extracting => write!(f, "extracting"),
            Stage::Transcribing => write!(f, "transcribing"),
            Stage::FetchingMetadata => write!(f, "fetching-metadata"),
            Stage::Summarizing => write!(f, "summarizing"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// Library-level error type for Recap operations.
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid summary length: {0}")]
    InvalidLength(String),

    #[error("Audio extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Metadata retrieval failed: {0}")]
    MetadataFailed(String),

    #[error("Summarization failed: {0}")]
    SummarizationFailed(String),

    #[error("Stage '{stage}' timed out after {seconds}s")]
    Timeout { stage: Stage, seconds: u64 },

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl RecapError {
    /// The pipeline stage this failure belongs to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RecapError::InvalidInput(_) | RecapError::InvalidLength(_) => Some(Stage::Validating),
            RecapError::ExtractionFailed(_) | RecapError::ToolNotFound(_) => {
                Some(Stage::Extracting)
            }
            RecapError::TranscriptionFailed(_) => Some(Stage::Transcribing),
            RecapError::MetadataFailed(_) => Some(Stage::FetchingMetadata),
            RecapError::SummarizationFailed(_) => Some(Stage::Summarizing),
            RecapError::Timeout { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the caller sent something we refuse to process.
    pub fn is_user_error(&self) -> bool {
        matches!(self, RecapError::InvalidInput(_) | RecapError::InvalidLength(_))
    }

    /// The message safe to show outside the process.
    ///
    /// Upstream causes stay in the logs; every non-validation failure collapses
    /// to the same generic text.
    pub fn public_message(&self) -> &'static str {
        match self {
            RecapError::InvalidInput(_) => INVALID_URL_MESSAGE,
            RecapError::InvalidLength(_) => "Invalid summary length",
            _ => PROCESSING_FAILED_MESSAGE,
        }
    }
}

/// Result type alias for Recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;

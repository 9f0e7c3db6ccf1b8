//! Configuration settings for Recap.

use crate::request::{Length, Style};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub extraction: ExtractionSettings,
    pub transcription: TranscriptionSettings,
    pub metadata: MetadataSettings,
    pub summary: SummarySettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for request-scoped audio artifacts.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/recap".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

/// OpenAI-compatible API provider used for speech-to-text and chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the API.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Upper bound for any single HTTP request to the provider.
    pub request_timeout_seconds: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            request_timeout_seconds: 300,
        }
    }
}

/// Audio extraction (yt-dlp) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Downloader executable.
    pub binary: String,
    /// Audio container requested from the downloader.
    pub audio_format: String,
    pub timeout_seconds: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            audio_format: "mp3".to_string(),
            timeout_seconds: 600,
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Acoustic model identifier.
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-large-v3".to_string(),
            timeout_seconds: 600,
        }
    }
}

/// Page metadata scraping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Suffix stripped from the page title.
    pub title_suffix: String,
    /// Used when the page has no description meta tag.
    pub fallback_description: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            title_suffix: " - YouTube".to_string(),
            fallback_description: "No description available".to_string(),
            user_agent: concat!("recap/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Summary generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Chat model used for summaries.
    pub model: String,
    /// Style used when a request does not name one.
    pub default_style: Style,
    /// Length used when a request does not name one.
    pub default_length: Length,
    pub timeout_seconds: u64,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: "mixtral-8x7b-32768".to_string(),
            default_style: Style::Formal,
            default_length: Length::Medium,
            timeout_seconds: 120,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory holding a `summary.toml` that overrides the built-in templates.
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&Path>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::RecapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recap")
            .join("config.toml")
    }

    /// The file this run reads: `--config` (with `~` expanded) or the default.
    pub fn resolve_config_path(flag: Option<&str>) -> PathBuf {
        flag.map(Self::expand_path)
            .unwrap_or_else(Self::default_config_path)
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

/// Per-stage deadlines for the pipeline's external calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub transcription: Duration,
    pub metadata: Duration,
    pub summary: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for StageTimeouts {
    fn from(settings: &Settings) -> Self {
        Self {
            transcription: Duration::from_secs(settings.transcription.timeout_seconds),
            metadata: Duration::from_secs(settings.metadata.timeout_seconds),
            summary: Duration::from_secs(settings.summary.timeout_seconds),
        }
    }
}

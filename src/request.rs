//! Digest requests: the video URL plus the tone and size of the summary.

use crate::error::{RecapError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Substring every accepted video URL must contain.
pub const VIDEO_URL_MARKER: &str = "youtube.com/watch?v=";

static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"youtube\.com/watch\?v=([a-zA-Z0-9_-]{11})").expect("Invalid regex")
});

/// Summarization tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    Technical,
    #[default]
    Formal,
    Casual,
    BulletPoints,
}

impl Style {
    /// Parse a style name, returning `None` for anything unrecognized.
    ///
    /// Unknown styles are not an error: the prompt builder switches to its
    /// neutral template instead.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl std::str::FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Ok(Style::Technical),
            "formal" => Ok(Style::Formal),
            "casual" => Ok(Style::Casual),
            "bullet-points" | "bullet_points" | "bullets" => Ok(Style::BulletPoints),
            _ => Err(format!("Unknown prompt style: {}", s)),
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Style::Technical => write!(f, "technical"),
            Style::Formal => write!(f, "formal"),
            Style::Casual => write!(f, "casual"),
            Style::BulletPoints => write!(f, "bullet-points"),
        }
    }
}

/// Summary size selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    #[default]
    Medium,
    Detailed,
}

impl Length {
    /// Approximate word ceiling handed to the language model.
    pub fn token_budget(self) -> u32 {
        match self {
            Length::Short => 100,
            Length::Medium => 250,
            Length::Detailed => 500,
        }
    }
}

impl std::str::FromStr for Length {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Length::Short),
            "medium" => Ok(Length::Medium),
            "detailed" => Ok(Length::Detailed),
            _ => Err(format!("Unknown summary length: {}", s)),
        }
    }
}

impl std::fmt::Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Length::Short => write!(f, "short"),
            Length::Medium => write!(f, "medium"),
            Length::Detailed => write!(f, "detailed"),
        }
    }
}

/// A validated request for a video digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRequest {
    /// Video page URL.
    pub url: String,
    /// Tone of the summary. `None` selects the neutral template.
    pub style: Option<Style>,
    /// Size of the summary.
    pub length: Length,
}

impl DigestRequest {
    /// Create a request with explicit style and length.
    pub fn new(url: impl Into<String>, style: Style, length: Length) -> Self {
        Self {
            url: url.into(),
            style: Some(style),
            length,
        }
    }

    /// Build a request from loosely-typed inputs (HTTP body, CLI flags).
    ///
    /// A missing style or length takes the given default. An unknown style
    /// maps to the neutral template; an unknown length is rejected.
    pub fn from_parts(
        url: Option<&str>,
        style: Option<&str>,
        length: Option<&str>,
        default_style: Style,
        default_length: Length,
    ) -> Result<Self> {
        let url = url.unwrap_or_default().trim();
        validate_url(url)?;

        let style = match style {
            Some(s) => Style::parse_lenient(s),
            None => Some(default_style),
        };

        let length = match length {
            Some(l) => l.parse().map_err(RecapError::InvalidLength)?,
            None => default_length,
        };

        Ok(Self {
            url: url.to_string(),
            style,
            length,
        })
    }

    /// Token budget derived from the requested length.
    pub fn token_budget(&self) -> u32 {
        self.length.token_budget()
    }
}

/// Check whether a URL points at a playable video page.
pub fn is_video_url(url: &str) -> bool {
    !url.trim().is_empty() && url.contains(VIDEO_URL_MARKER)
}

/// Reject URLs that do not carry the video marker.
pub fn validate_url(url: &str) -> Result<()> {
    if is_video_url(url) {
        Ok(())
    } else {
        Err(RecapError::InvalidInput(format!("Not a video URL: {:?}", url)))
    }
}

/// Extract the 11-character video ID, if the URL carries one.
pub fn video_id(url: &str) -> Option<String> {
    VIDEO_ID_REGEX
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

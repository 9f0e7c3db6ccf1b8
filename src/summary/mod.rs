//! Summary generation.
//!
//! The prompt builder is a pure function; the [`Summarizer`] is the only part
//! that talks to a language model.

mod chat;
mod prompt;

pub use chat::ChatSummarizer;
pub use prompt::build_prompt;

use crate::error::Result;
use async_trait::async_trait;

/// Returned when the model produces no content. Not an error.
pub const NO_SUMMARY: &str = "No summary generated";

/// Trait for text-generation backends.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generate a summary for `prompt`, asking the model to stay within `max_tokens`.
    async fn summarize(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// Map an optional completion to the summary text.
pub fn summary_or_fallback(content: Option<String>) -> String {
    content
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| NO_SUMMARY.to_string())
}

//! Recap - video transcripts and summaries
//!
//! Turns a video URL into a structured digest: the raw transcript, the page's
//! title and description, and an LLM summary whose tone and length are chosen
//! by the caller.
//!
//! # Architecture
//!
//! - `request` - Request types, style/length selectors and URL validation
//! - `audio` - Audio extraction into request-scoped artifacts (yt-dlp)
//! - `transcription` - Speech-to-text
//! - `metadata` - Page title/description scraping
//! - `summary` - Prompt building and text generation
//! - `orchestrator` - Pipeline coordination, cleanup and error mapping
//! - `config` - Settings and prompt templates
//! - `cli` - Command line and HTTP API
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::config::Settings;
//! use recap::orchestrator::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(&settings)?;
//!
//!     let request = pipeline.request(
//!         Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
//!         Some("bullet-points"),
//!         Some("short"),
//!     )?;
//!     let digest = pipeline.process(&request).await?;
//!     println!("{}\n\n{}", digest.metadata.title, digest.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod metadata;
pub mod openai;
pub mod orchestrator;
pub mod request;
pub mod summary;
pub mod transcription;

pub use error::{RecapError, Result};

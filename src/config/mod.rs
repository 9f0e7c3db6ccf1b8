//! Configuration module for Recap.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummaryPrompts};
pub use settings::{
    ExtractionSettings, GeneralSettings, MetadataSettings, PromptSettings, ProviderSettings,
    ServerSettings, Settings, StageTimeouts, SummarySettings, TranscriptionSettings,
};

//! Summary prompt construction.

use crate::config::{Prompts, SummaryPrompts};
use crate::metadata::Metadata;
use crate::request::Style;
use std::collections::HashMap;

impl SummaryPrompts {
    /// Instruction template for a style; `None` selects the neutral one.
    pub fn template_for(&self, style: Option<Style>) -> &str {
        match style {
            Some(Style::Technical) => &self.technical,
            Some(Style::Formal) => &self.formal,
            Some(Style::Casual) => &self.casual,
            Some(Style::BulletPoints) => &self.bullet_points,
            None => &self.fallback,
        }
    }
}

/// Build the instruction sent to the language model.
///
/// Pure and deterministic: the same inputs always yield the same string.
pub fn build_prompt(
    prompts: &Prompts,
    transcript: &str,
    metadata: &Metadata,
    style: Option<Style>,
    max_words: u32,
) -> String {
    let mut vars = HashMap::new();
    vars.insert("title".to_string(), metadata.title.clone());
    vars.insert("description".to_string(), metadata.description.clone());
    vars.insert("transcript".to_string(), transcript.to_string());
    vars.insert("max_words".to_string(), max_words.to_string());

    let data = prompts.render_with_custom(&prompts.summary.data, &vars);

    let mut outer = HashMap::new();
    outer.insert("data".to_string(), data);

    prompts.render_with_custom(prompts.summary.template_for(style), &outer)
}

//! Prompt templates for Recap.
//!
//! Templates can be customized by placing a `summary.toml` file in the custom
//! prompts directory. Placeholders use the `{{name}}` syntax.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Per-style instructions for summarization.
///
/// Every style template embeds `{{data}}`, which is replaced by the rendered
/// `data` block (title, description, transcript and word budget).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummaryPrompts {
    pub technical: String,
    pub formal: String,
    pub casual: String,
    pub bullet_points: String,
    /// Neutral template for unrecognized styles.
    pub fallback: String,
    pub data: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            technical: r#"Summarize the following YouTube video transcription with a focus on technical accuracy and key concepts. Extract and clarify the main ideas, methodologies, frameworks, formulas, or processes discussed. Maintain precision and avoid unnecessary simplifications while keeping the summary concise and structured. If applicable, include relevant terminology, definitions, or key takeaways.
{{data}}"#.to_string(),

            formal: r#"Summarize the following YouTube video transcription in a professional and structured manner. Highlight the key arguments, main ideas, and conclusions while maintaining clarity and conciseness. Ensure the summary remains objective, avoiding unnecessary details or filler words.
{{data}}"#.to_string(),

            casual: r#"Give me a quick and easy-to-understand summary of this YouTube video transcription. Keep it conversational and to the point, like you're explaining it to a friend. Focus on the main ideas and takeaways, but feel free to simplify complex points.
{{data}}"#.to_string(),

            bullet_points: r#"Summarize this YouTube video transcription using bullet points. Focus on the key ideas, main arguments, and any important conclusions. Keep each point concise and clear, avoiding unnecessary details. The goal is to provide a structured, easy-to-skim summary.
{{data}}"#.to_string(),

            fallback: r#"Summarize and explain the content based on:
{{data}}
Provide a concise summary in 2-3 sentences, followed by a brief explanation."#.to_string(),

            data: r#"Title: {{title}}
Description: {{description}}
Transcription: {{transcript}}
Keep the summary within {{max_words}} words."#.to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single left-to-right pass: inserted values are never
    /// rescanned, so a transcript containing `{{title}}` stays literal.
    /// Unknown placeholders are left untouched.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];

            match after_open.find("}}") {
                Some(close) => {
                    let key = &after_open[..close];
                    match vars.get(key.trim()) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after_open[close + 2..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

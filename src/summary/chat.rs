//! Chat-completion summarizer.

use super::{summary_or_fallback, Summarizer};
use crate::error::{RecapError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Summarizer sending the prompt as a single user turn.
pub struct ChatSummarizer {
    client: Client<OpenAIConfig>,
    model: String,
}

impl ChatSummarizer {
    pub fn new(client: Client<OpenAIConfig>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn summarize(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| RecapError::SummarizationFailed(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(max_tokens)
            .build()
            .map_err(|e| RecapError::SummarizationFailed(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            RecapError::SummarizationFailed(format!("Chat completion API error: {}", e))
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);

        debug!(has_content = content.is_some(), "Summarization completed");
        Ok(summary_or_fallback(content))
    }
}

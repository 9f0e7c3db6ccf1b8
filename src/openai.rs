//! OpenAI-compatible client configuration.
//!
//! Both speech-to-text and chat go through one client pointed at the
//! configured provider (Groq by default).

use crate::config::ProviderSettings;
use crate::error::{RecapError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for the configured provider.
///
/// The API key is read from the environment variable named in the settings.
/// A missing key is not an error here; requests will fail upstream instead.
pub fn create_client(provider: &ProviderSettings) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(provider.request_timeout_seconds))
        .build()
        .map_err(|e| RecapError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let api_key = std::env::var(&provider.api_key_env).unwrap_or_default();
    let config = OpenAIConfig::new()
        .with_api_base(&provider.api_base)
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Check if the provider's API key is configured.
pub fn is_api_key_configured(provider: &ProviderSettings) -> bool {
    std::env::var(&provider.api_key_env).is_ok_and(|key| !key.is_empty())
}

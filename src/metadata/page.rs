//! HTML page fetching and parsing.

use super::{Metadata, MetadataFetcher};
use crate::config::MetadataSettings;
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument};

/// Fetches a video page over HTTP and reads its `<title>` and description.
pub struct HtmlMetadataFetcher {
    client: Client,
    title_suffix: String,
    fallback_description: String,
}

impl HtmlMetadataFetcher {
    pub fn with_config(settings: &MetadataSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(&settings.user_agent)
            .build()
            .map_err(|e| RecapError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            title_suffix: settings.title_suffix.clone(),
            fallback_description: settings.fallback_description.clone(),
        })
    }
}

#[async_trait]
impl MetadataFetcher for HtmlMetadataFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<Metadata> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RecapError::MetadataFailed(format!("Page request failed: {}", e)))?;

        let html = response
            .text()
            .await
            .map_err(|e| RecapError::MetadataFailed(format!("Failed to read page body: {}", e)))?;

        let metadata = parse_metadata(&html, &self.title_suffix, &self.fallback_description)?;
        debug!(title = %metadata.title, "Metadata fetched");
        Ok(metadata)
    }
}

/// Extract title and description from a page.
///
/// The first occurrence of `title_suffix` is removed from the title. A missing
/// or blank title is an error; a missing or blank description becomes
/// `fallback_description`.
pub fn parse_metadata(html: &str, title_suffix: &str, fallback_description: &str) -> Result<Metadata> {
    let document = Html::parse_document(html);

    let title_selector = selector("title")?;
    let description_selector = selector(r#"meta[name="description"]"#)?;

    let raw_title: String = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| RecapError::MetadataFailed("Page has no <title>".into()))?;

    let title = if title_suffix.is_empty() {
        raw_title.trim().to_string()
    } else {
        raw_title.replacen(title_suffix, "", 1).trim().to_string()
    };

    if title.is_empty() {
        return Err(RecapError::MetadataFailed("Page title is empty".into()));
    }

    let description = document
        .select(&description_selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(fallback_description)
        .to_string();

    Ok(Metadata { title, description })
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| RecapError::MetadataFailed(format!("Invalid selector {:?}: {}", css, e)))
}

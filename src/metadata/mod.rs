//! Video page metadata: title and description.

mod page;

pub use page::{parse_metadata, HtmlMetadataFetcher};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata scraped from a video page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    /// Falls back to a placeholder when the page has none.
    pub description: String,
}

/// Trait for metadata sources.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Metadata>;
}

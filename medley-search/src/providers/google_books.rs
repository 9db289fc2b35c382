//! Google Books provider.

use async_trait::async_trait;
use medley_core::ProviderConfig;
use serde::Deserialize;

use super::{BookCatalog, build_http_client, endpoint, fetch_json};
use crate::errors::ProviderError;

/// Google Books caps `maxResults` at 40.
const MAX_PAGE_SIZE: usize = 40;

/// Volume list; `items` is absent when nothing matched.
#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

/// Single volume from the Google Books search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    /// Google Books volume id
    pub id: String,
    /// Bibliographic details
    #[serde(rename = "volumeInfo", default)]
    pub volume_info: VolumeInfo,
}

/// Bibliographic part of a volume record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    /// Main title
    pub title: Option<String>,
    /// Subtitle, if any
    pub subtitle: Option<String>,
    /// Author names in credit order
    #[serde(default)]
    pub authors: Vec<String>,
    /// `2011`, `2011-06` or `2011-06-14`
    pub published_date: Option<String>,
    /// Already on a 0-5 scale
    pub average_rating: Option<f32>,
    /// Subject categories, most specific last
    #[serde(default)]
    pub categories: Vec<String>,
    /// Cover images
    pub image_links: Option<ImageLinks>,
}

/// Cover image URLs of a volume.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    /// Regular thumbnail
    pub thumbnail: Option<String>,
    /// Smaller thumbnail
    pub small_thumbnail: Option<String>,
}

impl VolumeInfo {
    /// Best available cover thumbnail.
    pub fn thumbnail(&self) -> Option<&str> {
        let links = self.image_links.as_ref()?;
        links
            .thumbnail
            .as_deref()
            .or(links.small_thumbnail.as_deref())
    }

    /// Authors joined for display, `None` when the volume lists none.
    pub fn joined_authors(&self) -> Option<String> {
        let authors: Vec<&str> = self
            .authors
            .iter()
            .map(|author| author.trim())
            .filter(|author| !author.is_empty())
            .collect();

        if authors.is_empty() {
            None
        } else {
            Some(authors.join(", "))
        }
    }
}

/// Google Books API client.
#[derive(Debug)]
pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    /// Create a Google Books client from provider configuration.
    ///
    /// # Errors
    /// - `ProviderError::Network` - HTTP client could not be built
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.google_books_base_url.clone(),
            api_key: config.google_books_api_key.clone(),
        })
    }
}

#[async_trait]
impl BookCatalog for GoogleBooksClient {
    async fn search_volumes(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Volume>, ProviderError> {
        let max_results = limit.clamp(1, MAX_PAGE_SIZE).to_string();
        let mut params = vec![("q", query), ("maxResults", max_results.as_str())];
        if let Some(ref key) = self.api_key {
            params.push(("key", key.as_str()));
        }
        let url = endpoint(&self.base_url, "volumes", &params)?;

        tracing::debug!("Google Books search for '{}'", query);
        let response: VolumesResponse = fetch_json(&self.client, url).await?;
        Ok(response.items)
    }
}

//! iTunes Search music provider.

use async_trait::async_trait;
use medley_core::ProviderConfig;
use serde::Deserialize;

use super::{MusicCatalog, build_http_client, endpoint, fetch_json};
use crate::errors::ProviderError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItunesSearchResponse {
    #[serde(default)]
    results: Vec<ItunesItem>,
}

/// Album or track record from the iTunes Search API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItunesItem {
    /// `collection` for albums, `track` for songs
    pub wrapper_type: Option<String>,
    /// Album id
    pub collection_id: Option<u64>,
    /// Track id, only on track records
    pub track_id: Option<u64>,
    /// Album title
    pub collection_name: Option<String>,
    /// Track title
    pub track_name: Option<String>,
    /// Performing artist
    pub artist_name: Option<String>,
    /// Album artist, set on compilations
    pub collection_artist_name: Option<String>,
    /// ISO timestamp, e.g. `2017-10-27T07:00:00Z`
    pub release_date: Option<String>,
    /// 100x100 cover art URL
    #[serde(rename = "artworkUrl100")]
    pub artwork_url100: Option<String>,
    /// Main genre label
    pub primary_genre_name: Option<String>,
}

impl ItunesItem {
    /// Whether the record describes a single track rather than an album.
    pub fn is_track(&self) -> bool {
        self.wrapper_type.as_deref() == Some("track")
    }

    /// Native id matching the record kind.
    pub fn native_id(&self) -> Option<u64> {
        if self.is_track() {
            self.track_id.or(self.collection_id)
        } else {
            self.collection_id.or(self.track_id)
        }
    }

    /// Track or album title matching the record kind.
    pub fn display_title(&self) -> Option<&str> {
        if self.is_track() {
            self.track_name.as_deref().or(self.collection_name.as_deref())
        } else {
            self.collection_name.as_deref().or(self.track_name.as_deref())
        }
    }
}

/// iTunes Search API client. No key is required.
#[derive(Debug)]
pub struct ItunesClient {
    client: reqwest::Client,
    base_url: String,
}

impl ItunesClient {
    /// Create an iTunes client from provider configuration.
    ///
    /// # Errors
    /// - `ProviderError::Network` - HTTP client could not be built
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.itunes_base_url.clone(),
        })
    }
}

#[async_trait]
impl MusicCatalog for ItunesClient {
    async fn search_albums(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ItunesItem>, ProviderError> {
        let limit = limit.to_string();
        let params = [
            ("term", query),
            ("media", "music"),
            ("entity", "album"),
            ("limit", limit.as_str()),
        ];
        let url = endpoint(&self.base_url, "search", &params)?;

        tracing::debug!("iTunes search for '{}'", query);
        let response: ItunesSearchResponse = fetch_json(&self.client, url).await?;
        Ok(response.results)
    }
}

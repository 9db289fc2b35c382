//! RAWG games provider.

use async_trait::async_trait;
use medley_core::ProviderConfig;
use serde::Deserialize;

use super::{GameCatalog, build_http_client, endpoint, fetch_json};
use crate::errors::ProviderError;

/// Response from the RAWG game search endpoint.
#[derive(Debug, Deserialize)]
struct RawgSearchResponse {
    #[serde(default)]
    results: Vec<RawgGame>,
}

/// Single game record from RAWG search.
#[derive(Debug, Clone, Deserialize)]
pub struct RawgGame {
    /// RAWG game id
    pub id: u64,
    /// Game title
    #[serde(default)]
    pub name: String,
    /// Release date, `YYYY-MM-DD`
    pub released: Option<String>,
    /// Already on a 0-5 scale
    pub rating: Option<f32>,
    /// Cover image URL
    pub background_image: Option<String>,
    /// Genres, primary first
    #[serde(default)]
    pub genres: Vec<RawgNamed>,
    /// Rarely present on search results; the detail call fills it in
    #[serde(default)]
    pub developers: Vec<RawgNamed>,
    /// Publishers, used when no developer is known
    #[serde(default)]
    pub publishers: Vec<RawgNamed>,
    /// Number of users who added the game, used as popularity
    pub added: Option<u32>,
}

/// Named reference (genre, developer, publisher).
#[derive(Debug, Clone, Deserialize)]
pub struct RawgNamed {
    /// Display name
    pub name: String,
}

/// Detail payload; only the developer list matters here.
#[derive(Debug, Deserialize)]
struct RawgGameDetail {
    #[serde(default)]
    developers: Vec<RawgNamed>,
}

/// RAWG API client.
#[derive(Debug)]
pub struct RawgClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RawgClient {
    /// Create a RAWG client from provider configuration.
    ///
    /// # Errors
    /// - `ProviderError::Network` - HTTP client could not be built
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.rawg_base_url.clone(),
            api_key: config.rawg_api_key.clone(),
        })
    }

    fn with_key<'a>(&'a self, mut params: Vec<(&'a str, &'a str)>) -> Vec<(&'a str, &'a str)> {
        if let Some(ref key) = self.api_key {
            params.push(("key", key.as_str()));
        }
        params
    }
}

#[async_trait]
impl GameCatalog for RawgClient {
    async fn search_games(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RawgGame>, ProviderError> {
        let page_size = limit.to_string();
        let params = self.with_key(vec![("search", query), ("page_size", page_size.as_str())]);
        let url = endpoint(&self.base_url, "games", &params)?;

        tracing::debug!("RAWG search for '{}'", query);
        let response: RawgSearchResponse = fetch_json(&self.client, url).await?;
        Ok(response.results)
    }

    fn game_detail_url(&self, game_id: u64) -> String {
        format!("{}/games/{game_id}", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_game_developer(&self, game_id: u64) -> Result<Option<String>, ProviderError> {
        let params = self.with_key(Vec::new());
        let url = endpoint(&self.base_url, &format!("games/{game_id}"), &params)?;

        let detail: RawgGameDetail = fetch_json(&self.client, url).await?;
        Ok(detail.developers.into_iter().next().map(|d| d.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_payload_decodes() {
        let body = r#"{
            "count": 2,
            "results": [
                {
                    "id": 28,
                    "name": "Red Dead Redemption 2",
                    "released": "2018-10-26",
                    "rating": 4.59,
                    "background_image": "https://media.rawg.io/media/games/511/rdr2.jpg",
                    "genres": [{"id": 4, "name": "Action"}],
                    "added": 17000
                },
                {"id": 99, "name": "Unreleased Thing", "released": null, "rating": 0}
            ]
        }"#;

        let response: RawgSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.results.len(), 2);

        let game = &response.results[0];
        assert_eq!(game.id, 28);
        assert_eq!(game.genres[0].name, "Action");
        assert!(game.developers.is_empty());
        assert_eq!(response.results[1].released, None);
    }

    #[test]
    fn test_detail_url_is_stable_cache_key() {
        let config = ProviderConfig {
            rawg_api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let client = RawgClient::new(&config).unwrap();

        assert_eq!(client.game_detail_url(28), "https://api.rawg.io/api/games/28");
    }
}

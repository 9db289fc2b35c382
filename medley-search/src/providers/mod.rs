//! Provider clients producing provider-native records.
//!
//! Each content provider gets a catalog trait describing the calls the
//! matching source adapter needs, plus a reqwest implementation. Adapters
//! depend on the traits only, so tests can script provider behaviour.

use async_trait::async_trait;
use medley_core::ProviderConfig;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::errors::ProviderError;

pub mod google_books;
pub mod itunes;
pub mod rawg;
pub mod tmdb;

pub use google_books::{GoogleBooksClient, ImageLinks, Volume, VolumeInfo};
pub use itunes::{ItunesClient, ItunesItem};
pub use rawg::{RawgClient, RawgGame, RawgNamed};
pub use tmdb::{TmdbClient, TmdbMediaKind, TmdbTitle};

/// Game search with a developer detail lookup.
#[async_trait]
pub trait GameCatalog: Send + Sync + std::fmt::Debug {
    /// Search games by name.
    ///
    /// # Errors
    /// - `ProviderError::RateLimited` - Provider quota exhausted
    /// - `ProviderError::Network` - Network connectivity issues
    async fn search_games(&self, query: &str, limit: usize) -> Result<Vec<RawgGame>, ProviderError>;

    /// URL of the detail resource for a game, used as the lookup cache key.
    fn game_detail_url(&self, game_id: u64) -> String;

    /// Fetch the first listed developer of a game.
    ///
    /// # Errors
    /// - `ProviderError` - Detail request failed
    async fn fetch_game_developer(&self, game_id: u64) -> Result<Option<String>, ProviderError>;
}

/// Movie and series search with a director/creator detail lookup.
#[async_trait]
pub trait MovieCatalog: Send + Sync + std::fmt::Debug {
    /// Search movies and series by title.
    ///
    /// # Errors
    /// - `ProviderError::RateLimited` - Provider quota exhausted
    /// - `ProviderError::Network` - Network connectivity issues
    async fn search_titles(&self, query: &str, limit: usize)
    -> Result<Vec<TmdbTitle>, ProviderError>;

    /// URL of the credits resource for a title, used as the lookup cache key.
    fn credits_url(&self, kind: TmdbMediaKind, id: u64) -> String;

    /// Fetch the director of a movie or the creator of a series.
    ///
    /// # Errors
    /// - `ProviderError` - Detail request failed
    async fn fetch_director(
        &self,
        kind: TmdbMediaKind,
        id: u64,
    ) -> Result<Option<String>, ProviderError>;
}

/// Album and track search.
#[async_trait]
pub trait MusicCatalog: Send + Sync + std::fmt::Debug {
    /// Search albums by term.
    ///
    /// # Errors
    /// - `ProviderError` - Search request failed
    async fn search_albums(&self, query: &str, limit: usize)
    -> Result<Vec<ItunesItem>, ProviderError>;
}

/// Book volume search.
#[async_trait]
pub trait BookCatalog: Send + Sync + std::fmt::Debug {
    /// Search volumes by free text.
    ///
    /// # Errors
    /// - `ProviderError` - Search request failed
    async fn search_volumes(&self, query: &str, limit: usize) -> Result<Vec<Volume>, ProviderError>;
}

/// Maps a provider HTTP status onto the error taxonomy.
///
/// # Errors
/// - `ProviderError::RateLimited` - HTTP 429
/// - `ProviderError::Status` - Any other non-success status
pub fn classify_status(status: StatusCode) -> Result<(), ProviderError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Err(ProviderError::RateLimited)
    } else {
        Err(ProviderError::Status {
            status: status.as_u16(),
        })
    }
}

/// Whether an error body says the caller ran out of quota.
///
/// RAWG and Google Books report exhausted keys with 401/403 plus a message
/// rather than 429.
pub fn mentions_quota(body: &str) -> bool {
    let body = body.to_lowercase();
    ["quota", "rate limit", "ratelimit", "too many requests"]
        .iter()
        .any(|needle| body.contains(needle))
}

/// Builds the shared HTTP client for provider calls.
///
/// # Errors
/// - `ProviderError::Network` - TLS backend could not be initialized
pub fn build_http_client(config: &ProviderConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent)
        .build()
        .map_err(|e| ProviderError::Network {
            reason: format!("HTTP client setup failed: {e}"),
        })
}

/// GET a URL and decode its JSON body.
///
/// # Errors
/// - `ProviderError::RateLimited` - HTTP 429 or a quota message
/// - `ProviderError::Status` - Other non-success status
/// - `ProviderError::Network` - Transport failure
/// - `ProviderError::Parse` - Body did not match `T`
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: url::Url,
) -> Result<T, ProviderError> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if let Err(error) = classify_status(status) {
        if mentions_quota(&body) {
            return Err(ProviderError::RateLimited);
        }
        return Err(error);
    }

    serde_json::from_str(&body).map_err(|e| ProviderError::Parse {
        reason: format!("{} returned unexpected JSON: {e}", url.path()),
    })
}

/// Parses a base URL plus path with query parameters.
///
/// # Errors
/// - `ProviderError::Network` - Base URL is not a valid URL
pub(crate) fn endpoint(
    base_url: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<url::Url, ProviderError> {
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'));
    let mut url = url::Url::parse(&raw).map_err(|e| ProviderError::Network {
        reason: format!("invalid provider URL {raw}: {e}"),
    })?;

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::OK), Ok(()));
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Err(ProviderError::RateLimited)
        );
        assert_eq!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE),
            Err(ProviderError::Status { status: 503 })
        );
    }

    #[test]
    fn test_quota_messages_are_recognized() {
        assert!(mentions_quota(
            r#"{"error": "The monthly API limit reached. Quota exceeded."}"#
        ));
        assert!(mentions_quota("Rate Limit Exceeded"));
        assert!(!mentions_quota(r#"{"detail": "Not found."}"#));
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let url = endpoint(
            "https://api.rawg.io/api/",
            "/games",
            &[("search", "mario & luigi"), ("page_size", "8")],
        )
        .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.rawg.io/api/games?search=mario+%26+luigi&page_size=8"
        );
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        assert!(matches!(
            endpoint("not a url", "games", &[]),
            Err(ProviderError::Network { .. })
        ));
    }
}

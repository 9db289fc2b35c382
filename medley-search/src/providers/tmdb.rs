//! TMDB movies and TV provider.

use async_trait::async_trait;
use medley_core::ProviderConfig;
use serde::Deserialize;

use super::{MovieCatalog, build_http_client, endpoint, fetch_json};
use crate::errors::ProviderError;

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Response from the TMDB multi search endpoint.
#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbTitle>,
}

/// Movie, series or person record from TMDB multi search.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTitle {
    /// TMDB id, unique per media kind
    pub id: u64,
    /// `movie`, `tv` or `person`
    pub media_type: Option<String>,
    /// Movies carry `title`
    pub title: Option<String>,
    /// Series carry `name`
    pub name: Option<String>,
    /// Movie release date
    pub release_date: Option<String>,
    /// Series first air date
    pub first_air_date: Option<String>,
    /// 0-10 scale
    pub vote_average: Option<f32>,
    /// Number of votes behind the average
    pub vote_count: Option<u32>,
    /// Poster path relative to the image CDN
    pub poster_path: Option<String>,
    /// TMDB genre ids
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// TMDB popularity score
    pub popularity: Option<f32>,
}

/// Whether a TMDB record is a movie or a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmdbMediaKind {
    /// Feature film
    Movie,
    /// Television series
    Tv,
}

impl TmdbMediaKind {
    fn path(self) -> &'static str {
        match self {
            TmdbMediaKind::Movie => "movie",
            TmdbMediaKind::Tv => "tv",
        }
    }
}

impl TmdbTitle {
    /// Movie or series; people and unknown kinds yield `None`.
    pub fn kind(&self) -> Option<TmdbMediaKind> {
        match self.media_type.as_deref() {
            Some("movie") => Some(TmdbMediaKind::Movie),
            Some("tv") => Some(TmdbMediaKind::Tv),
            _ => None,
        }
    }

    /// Movie title or series name.
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }

    /// Release or first air date, whichever the record has.
    pub fn release(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .filter(|date| !date.is_empty())
    }

    /// Rating halved onto the 0-5 scale; unrated titles have none.
    pub fn normalized_rating(&self) -> Option<f32> {
        match (self.vote_average, self.vote_count) {
            (Some(_), Some(0)) => None,
            (Some(average), _) => Some(average / 2.0),
            (None, _) => None,
        }
    }

    /// Full poster URL on the TMDB image CDN.
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| format!("{POSTER_BASE_URL}{path}"))
    }

    /// Name of the first genre TMDB lists for the title.
    pub fn primary_genre(&self) -> Option<&'static str> {
        self.genre_ids.iter().find_map(|id| genre_name(*id))
    }
}

fn genre_name(id: u32) -> Option<&'static str> {
    let name = match id {
        28 => "Action",
        12 => "Adventure",
        16 => "Animation",
        35 => "Comedy",
        80 => "Crime",
        99 => "Documentary",
        18 => "Drama",
        10751 => "Family",
        14 => "Fantasy",
        36 => "History",
        27 => "Horror",
        10402 => "Music",
        9648 => "Mystery",
        10749 => "Romance",
        878 => "Science Fiction",
        53 => "Thriller",
        10752 => "War",
        37 => "Western",
        10759 => "Action & Adventure",
        10765 => "Sci-Fi & Fantasy",
        _ => return None,
    };
    Some(name)
}

#[derive(Debug, Deserialize)]
struct TmdbCredits {
    #[serde(default)]
    crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Deserialize)]
struct TmdbCrewMember {
    name: String,
    job: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbSeriesDetail {
    #[serde(default)]
    created_by: Vec<TmdbCreator>,
}

#[derive(Debug, Deserialize)]
struct TmdbCreator {
    name: String,
}

/// TMDB API client.
#[derive(Debug)]
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl TmdbClient {
    /// Create a TMDB client from provider configuration.
    ///
    /// # Errors
    /// - `ProviderError::Network` - HTTP client could not be built
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.tmdb_base_url.clone(),
            api_key: config.tmdb_api_key.clone(),
        })
    }

    fn with_key<'a>(&'a self, mut params: Vec<(&'a str, &'a str)>) -> Vec<(&'a str, &'a str)> {
        if let Some(ref key) = self.api_key {
            params.push(("api_key", key.as_str()));
        }
        params
    }

    fn detail_path(kind: TmdbMediaKind, id: u64) -> String {
        match kind {
            TmdbMediaKind::Movie => format!("movie/{id}/credits"),
            TmdbMediaKind::Tv => format!("tv/{id}"),
        }
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search_titles(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<TmdbTitle>, ProviderError> {
        let params = self.with_key(vec![("query", query), ("include_adult", "false")]);
        let url = endpoint(&self.base_url, "search/multi", &params)?;

        tracing::debug!("TMDB search for '{}'", query);
        let response: TmdbSearchResponse = fetch_json(&self.client, url).await?;

        Ok(response
            .results
            .into_iter()
            .filter(|title| title.kind().is_some())
            .take(limit)
            .collect())
    }

    fn credits_url(&self, kind: TmdbMediaKind, id: u64) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            Self::detail_path(kind, id)
        )
    }

    async fn fetch_director(
        &self,
        kind: TmdbMediaKind,
        id: u64,
    ) -> Result<Option<String>, ProviderError> {
        let params = self.with_key(Vec::new());
        let url = endpoint(&self.base_url, &Self::detail_path(kind, id), &params)?;
        tracing::trace!("TMDB {} detail for {}", kind.path(), id);

        match kind {
            TmdbMediaKind::Movie => {
                let credits: TmdbCredits = fetch_json(&self.client, url).await?;
                Ok(credits
                    .crew
                    .into_iter()
                    .find(|member| member.job.as_deref() == Some("Director"))
                    .map(|member| member.name))
            }
            TmdbMediaKind::Tv => {
                let detail: TmdbSeriesDetail = fetch_json(&self.client, url).await?;
                Ok(detail.created_by.into_iter().next().map(|c| c.name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_search_payload_decodes() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 438631, "media_type": "movie", "title": "Dune", "release_date": "2021-09-15",
                 "vote_average": 7.8, "vote_count": 12000, "poster_path": "/d5NXSklXo0qyIYkgV94XAgMIckC.jpg",
                 "genre_ids": [878, 12], "popularity": 120.5},
                {"id": 1399, "media_type": "tv", "name": "Game of Thrones", "first_air_date": "2011-04-17",
                 "vote_average": 8.4, "vote_count": 21000, "genre_ids": [10765]},
                {"id": 31, "media_type": "person", "name": "Tom Hanks"}
            ]
        }"#;

        let response: TmdbSearchResponse = serde_json::from_str(body).unwrap();
        let [movie, series, person] = response.results.as_slice() else {
            panic!("expected three records");
        };

        assert_eq!(movie.kind(), Some(TmdbMediaKind::Movie));
        assert_eq!(movie.display_title(), Some("Dune"));
        assert_eq!(movie.normalized_rating(), Some(3.9));
        assert_eq!(movie.primary_genre(), Some("Science Fiction"));
        assert_eq!(
            movie.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/d5NXSklXo0qyIYkgV94XAgMIckC.jpg")
        );

        assert_eq!(series.kind(), Some(TmdbMediaKind::Tv));
        assert_eq!(series.display_title(), Some("Game of Thrones"));
        assert_eq!(series.release(), Some("2011-04-17"));

        assert_eq!(person.kind(), None);
    }

    #[test]
    fn test_unvoted_title_has_no_rating() {
        let title: TmdbTitle = serde_json::from_str(
            r#"{"id": 1, "media_type": "movie", "title": "Soon", "vote_average": 0.0, "vote_count": 0}"#,
        )
        .unwrap();
        assert_eq!(title.normalized_rating(), None);
        assert_eq!(title.release(), None);
    }

    #[test]
    fn test_credits_pick_director() {
        let credits: TmdbCredits = serde_json::from_str(
            r#"{"id": 438631, "crew": [
                {"name": "Hans Zimmer", "job": "Original Music Composer"},
                {"name": "Denis Villeneuve", "job": "Director"}
            ]}"#,
        )
        .unwrap();

        let director = credits
            .crew
            .into_iter()
            .find(|member| member.job.as_deref() == Some("Director"))
            .map(|member| member.name);
        assert_eq!(director.as_deref(), Some("Denis Villeneuve"));
    }
}

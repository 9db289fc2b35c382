//! Movies and series adapter over TMDB.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::{AdapterLimits, SourceAdapter, lookup_creators, require_query};
use crate::cache::LookupCache;
use crate::errors::AdapterError;
use crate::normalizer::{current_year, parse_year, resolve_creator};
use crate::providers::{MovieCatalog, TmdbMediaKind, TmdbTitle};
use crate::types::{Category, IdPrefix, SearchResult};

/// Searches movies and series, enriching the top candidates with the
/// director (movies) or creator (series).
#[derive(Debug)]
pub struct MoviesAdapter<C> {
    catalog: C,
    lookups: Arc<LookupCache>,
    limits: AdapterLimits,
}

impl<C: MovieCatalog> MoviesAdapter<C> {
    /// Wraps a movie catalog; detail lookups go through `lookups`.
    pub fn new(catalog: C, lookups: Arc<LookupCache>, limits: AdapterLimits) -> Self {
        Self {
            catalog,
            lookups,
            limits,
        }
    }

    fn to_result(
        title: &TmdbTitle,
        kind: TmdbMediaKind,
        director: Option<&str>,
        fallback_year: i32,
    ) -> Option<SearchResult> {
        let prefix = match kind {
            TmdbMediaKind::Movie => IdPrefix::Movie,
            TmdbMediaKind::Tv => IdPrefix::Tv,
        };
        let year = title
            .release()
            .and_then(parse_year)
            .unwrap_or(fallback_year);
        let creator = resolve_creator(Category::Movies, [director]);

        let result = SearchResult::new(
            prefix,
            &title.id.to_string(),
            title.display_title().unwrap_or_default(),
            creator,
            year,
        );
        match result {
            Ok(result) => Some(
                result
                    .with_rating(title.normalized_rating())
                    .with_genre(title.primary_genre().map(str::to_string))
                    .with_image(title.poster_url())
                    .with_popularity(title.popularity),
            ),
            Err(e) => {
                tracing::debug!("Skipping TMDB title {}: {}", title.id, e);
                None
            }
        }
    }
}

#[async_trait]
impl<C: MovieCatalog> SourceAdapter for MoviesAdapter<C> {
    fn category(&self) -> Category {
        Category::Movies
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AdapterError> {
        let query = require_query(Category::Movies, query)?;
        let started = Instant::now();

        let titles: Vec<(TmdbTitle, TmdbMediaKind)> = self
            .catalog
            .search_titles(query, self.limits.max_results)
            .await
            .map_err(|e| AdapterError::from_provider(Category::Movies, e))?
            .into_iter()
            .filter_map(|title| title.kind().map(|kind| (title, kind)))
            .take(self.limits.max_results)
            .collect();

        let targets = titles
            .iter()
            .map(|(title, kind)| (self.catalog.credits_url(*kind, title.id), (*kind, title.id)))
            .collect();
        let directors = lookup_creators(
            &self.lookups,
            Category::Movies,
            targets,
            self.limits.enrich_top,
            |(kind, id)| self.catalog.fetch_director(kind, id),
        )
        .await;

        let fallback_year = current_year();
        let results: Vec<SearchResult> = titles
            .iter()
            .zip(directors)
            .filter_map(|((title, kind), director)| {
                Self::to_result(title, *kind, director.as_deref(), fallback_year)
            })
            .collect();

        tracing::debug!(
            "Movies search for '{}' produced {} results in {:?}",
            query,
            results.len(),
            started.elapsed()
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::errors::{AdapterErrorKind, ProviderError};

    fn title(id: u64, media_type: &str, name: &str, date: &str) -> TmdbTitle {
        TmdbTitle {
            id,
            media_type: Some(media_type.to_string()),
            title: (media_type == "movie").then(|| name.to_string()),
            name: (media_type != "movie").then(|| name.to_string()),
            release_date: (media_type == "movie").then(|| date.to_string()),
            first_air_date: (media_type != "movie").then(|| date.to_string()),
            vote_average: Some(8.0),
            vote_count: Some(500),
            poster_path: Some("/poster.jpg".to_string()),
            genre_ids: vec![18],
            popularity: Some(42.0),
        }
    }

    #[derive(Debug, Default)]
    struct ScriptedTmdb {
        titles: Vec<TmdbTitle>,
        failure: Option<ProviderError>,
        detail_calls: AtomicUsize,
    }

    #[async_trait]
    impl MovieCatalog for ScriptedTmdb {
        async fn search_titles(
            &self,
            _query: &str,
            limit: usize,
        ) -> Result<Vec<TmdbTitle>, ProviderError> {
            if let Some(ref failure) = self.failure {
                return Err(failure.clone());
            }
            Ok(self.titles.iter().take(limit).cloned().collect())
        }

        fn credits_url(&self, kind: TmdbMediaKind, id: u64) -> String {
            format!("https://tmdb.test/{kind:?}/{id}")
        }

        async fn fetch_director(
            &self,
            kind: TmdbMediaKind,
            _id: u64,
        ) -> Result<Option<String>, ProviderError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            match kind {
                TmdbMediaKind::Movie => Ok(Some("Denis Villeneuve".to_string())),
                TmdbMediaKind::Tv => Err(ProviderError::Network {
                    reason: "connection reset".to_string(),
                }),
            }
        }
    }

    fn adapter(catalog: ScriptedTmdb) -> MoviesAdapter<ScriptedTmdb> {
        MoviesAdapter::new(catalog, Arc::new(LookupCache::new()), AdapterLimits::default())
    }

    #[tokio::test]
    async fn test_movies_and_series_are_normalized() {
        let adapter = adapter(ScriptedTmdb {
            titles: vec![
                title(438631, "movie", "Dune", "2021-09-15"),
                title(90228, "tv", "Dune: Prophecy", "2024-11-17"),
                title(31, "person", "Timothée Chalamet", ""),
            ],
            ..Default::default()
        });

        let results = adapter.search("dune").await.unwrap();
        assert_eq!(results.len(), 2);

        let movie = &results[0];
        assert_eq!(movie.id(), "movie-438631");
        assert_eq!(movie.creator(), "Denis Villeneuve");
        assert_eq!(movie.rating(), Some(4.0));
        assert_eq!(movie.genre(), Some("Drama"));
        assert!(!movie.is_series());

        let series = &results[1];
        assert_eq!(series.id(), "tv-90228");
        assert!(series.is_series());
        assert_eq!(series.year(), 2024);
        // Failed detail call falls back to the placeholder
        assert_eq!(series.creator(), "Unknown Director");
    }

    #[tokio::test]
    async fn test_failed_detail_is_retried_next_search() {
        let adapter = adapter(ScriptedTmdb {
            titles: vec![title(1, "tv", "Severance", "2022-02-18")],
            ..Default::default()
        });

        adapter.search("severance").await.unwrap();
        adapter.search("severance").await.unwrap();
        assert_eq!(adapter.catalog.detail_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_provider_status_is_mapped() {
        let adapter = adapter(ScriptedTmdb {
            failure: Some(ProviderError::Status { status: 401 }),
            ..Default::default()
        });

        let error = adapter.search("dune").await.unwrap_err();
        assert_eq!(error.category, Category::Movies);
        assert_eq!(error.kind, AdapterErrorKind::Provider { status: 401 });
    }

    #[tokio::test]
    async fn test_empty_provider_list_is_not_an_error() {
        let adapter = adapter(ScriptedTmdb::default());
        assert!(adapter.search("zzzz").await.unwrap().is_empty());
    }
}

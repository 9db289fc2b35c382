//! Music adapter over the iTunes Search API.

use std::time::Instant;

use async_trait::async_trait;

use super::{AdapterLimits, SourceAdapter, require_query};
use crate::errors::AdapterError;
use crate::normalizer::{current_year, parse_year, resolve_creator};
use crate::providers::{ItunesItem, MusicCatalog};
use crate::types::{Category, IdPrefix, SearchResult};

/// Searches albums and tracks. iTunes carries the artist inline, so there
/// is no detail phase.
#[derive(Debug)]
pub struct MusicAdapter<C> {
    catalog: C,
    limits: AdapterLimits,
}

impl<C: MusicCatalog> MusicAdapter<C> {
    /// Wraps a music catalog with the given limits.
    pub fn new(catalog: C, limits: AdapterLimits) -> Self {
        Self { catalog, limits }
    }

    fn to_result(item: &ItunesItem, fallback_year: i32) -> Option<SearchResult> {
        let prefix = if item.is_track() {
            IdPrefix::Track
        } else {
            IdPrefix::Album
        };
        let native_id = item.native_id()?;
        let creator = resolve_creator(
            Category::Music,
            [
                item.artist_name.as_deref(),
                item.collection_artist_name.as_deref(),
            ],
        );
        let year = item
            .release_date
            .as_deref()
            .and_then(parse_year)
            .unwrap_or(fallback_year);

        let result = SearchResult::new(
            prefix,
            &native_id.to_string(),
            item.display_title().unwrap_or_default(),
            creator,
            year,
        );
        match result {
            Ok(result) => Some(
                result
                    .with_genre(item.primary_genre_name.clone())
                    .with_image(item.artwork_url100.clone()),
            ),
            Err(e) => {
                tracing::debug!("Skipping iTunes record {}: {}", native_id, e);
                None
            }
        }
    }
}

#[async_trait]
impl<C: MusicCatalog> SourceAdapter for MusicAdapter<C> {
    fn category(&self) -> Category {
        Category::Music
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AdapterError> {
        let query = require_query(Category::Music, query)?;
        let started = Instant::now();

        let items = self
            .catalog
            .search_albums(query, self.limits.max_results)
            .await
            .map_err(|e| AdapterError::from_provider(Category::Music, e))?;

        let fallback_year = current_year();
        let results: Vec<SearchResult> = items
            .iter()
            .filter_map(|item| Self::to_result(item, fallback_year))
            .take(self.limits.max_results)
            .collect();

        tracing::debug!(
            "Music search for '{}' produced {} results in {:?}",
            query,
            results.len(),
            started.elapsed()
        );
        Ok(results)
    }
}

//! Books adapter over Google Books.

use std::time::Instant;

use async_trait::async_trait;

use super::{AdapterLimits, SourceAdapter, require_query};
use crate::errors::AdapterError;
use crate::normalizer::{current_year, parse_year, resolve_creator};
use crate::providers::{BookCatalog, Volume};
use crate::types::{Category, IdPrefix, SearchResult};

/// Searches Google Books volumes. Every record carries its authors inline.
#[derive(Debug)]
pub struct BooksAdapter<C> {
    catalog: C,
    limits: AdapterLimits,
}

impl<C: BookCatalog> BooksAdapter<C> {
    /// Wraps a book catalog with the given limits.
    pub fn new(catalog: C, limits: AdapterLimits) -> Self {
        Self { catalog, limits }
    }

    fn to_result(volume: &Volume, fallback_year: i32) -> Option<SearchResult> {
        let info = &volume.volume_info;
        let authors = info.joined_authors();
        let creator = resolve_creator(Category::Books, [authors.as_deref()]);
        let year = info
            .published_date
            .as_deref()
            .and_then(parse_year)
            .unwrap_or(fallback_year);

        let result = SearchResult::new(
            IdPrefix::Book,
            &volume.id,
            info.title.as_deref().unwrap_or_default(),
            creator,
            year,
        );
        match result {
            Ok(result) => Some(
                result
                    .with_rating(info.average_rating)
                    .with_genre(info.categories.first().cloned())
                    .with_image(info.thumbnail().map(str::to_string)),
            ),
            Err(e) => {
                tracing::debug!("Skipping Google Books volume {}: {}", volume.id, e);
                None
            }
        }
    }
}

#[async_trait]
impl<C: BookCatalog> SourceAdapter for BooksAdapter<C> {
    fn category(&self) -> Category {
        Category::Books
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AdapterError> {
        let query = require_query(Category::Books, query)?;
        let started = Instant::now();

        let volumes = self
            .catalog
            .search_volumes(query, self.limits.max_results)
            .await
            .map_err(|e| AdapterError::from_provider(Category::Books, e))?;

        let fallback_year = current_year();
        let results: Vec<SearchResult> = volumes
            .iter()
            .filter_map(|volume| Self::to_result(volume, fallback_year))
            .take(self.limits.max_results)
            .collect();

        tracing::debug!(
            "Books search for '{}' produced {} results in {:?}",
            query,
            results.len(),
            started.elapsed()
        );
        Ok(results)
    }
}

//! Media search service
//!
//! Entry point for the presentation layer: wires configuration, caches,
//! adapters, fallback data and ranking together, and answers "is this
//! result already in the library" questions.

use std::sync::Arc;

use medley_core::{
    LibraryError, LibraryItem, LibraryStatus, LibraryStore, MedleyConfig, NewLibraryItem,
};

use crate::adapters::AdapterSet;
use crate::aggregator::{Aggregator, SearchOutcome};
use crate::cache::{CacheStatistics, SearchCaches};
use crate::errors::{ProviderError, SearchError};
use crate::fallback::FallbackPolicy;
use crate::normalizer::find_in_library;
use crate::ranker::Ranker;
use crate::types::{CategoryFilter, SearchResult};

/// Search result together with its library status, if tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedResult {
    /// The search result
    pub result: SearchResult,
    /// Library status when the result is tracked
    pub tracked: Option<LibraryStatus>,
}

impl AnnotatedResult {
    /// Whether the result is already in the library.
    pub fn is_tracked(&self) -> bool {
        self.tracked.is_some()
    }
}

/// Cross-domain media search service.
#[derive(Debug)]
pub struct MediaSearchService {
    config: MedleyConfig,
    caches: SearchCaches,
    aggregator: Aggregator,
}

impl MediaSearchService {
    /// Creates the service with HTTP providers for every category.
    ///
    /// # Errors
    /// - `ProviderError::Network` - An HTTP client could not be built
    pub fn from_config(config: MedleyConfig) -> Result<Self, ProviderError> {
        let caches = SearchCaches::new();
        let adapters = AdapterSet::from_config(&config, Arc::clone(&caches.lookups))?;
        Ok(Self::with_caches(config, adapters, caches))
    }

    /// Creates the service around caller-provided adapters and fresh caches.
    pub fn with_adapters(config: MedleyConfig, adapters: AdapterSet) -> Self {
        Self::with_caches(config, adapters, SearchCaches::new())
    }

    /// Creates the service around caller-provided adapters and caches.
    ///
    /// Adapters that enrich results should share `caches.lookups`.
    pub fn with_caches(config: MedleyConfig, adapters: AdapterSet, caches: SearchCaches) -> Self {
        let fallback = FallbackPolicy::from_config(&config.fallback);
        let aggregator = Aggregator::new(
            adapters,
            Arc::clone(&caches.results),
            fallback,
            &config.search,
        );

        Self {
            config,
            caches,
            aggregator,
        }
    }

    /// Pins the ranking year, mainly for reproducible tests.
    pub fn with_ranker(mut self, ranker: Ranker) -> Self {
        self.aggregator = self.aggregator.with_ranker(ranker);
        self
    }

    /// Replaces the fallback datasets derived from configuration.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.aggregator = self.aggregator.with_fallback(fallback);
        self
    }

    /// Search every category selected by `filter` and rank the merged results.
    ///
    /// # Errors
    /// - `SearchError::EmptyQuery` - Query is empty after trimming
    /// - `SearchError::AllSourcesFailed` - Every selected source failed
    pub async fn search(
        &self,
        query: &str,
        filter: CategoryFilter,
    ) -> Result<SearchOutcome, SearchError> {
        self.aggregator.aggregate(query, filter).await
    }

    /// Pairs each result with the status of its library entry.
    pub fn annotate(results: &[SearchResult], items: &[LibraryItem]) -> Vec<AnnotatedResult> {
        results
            .iter()
            .map(|result| AnnotatedResult {
                result: result.clone(),
                tracked: find_in_library(result, items).map(|item| item.status),
            })
            .collect()
    }

    /// Whether a result is already tracked in the library.
    pub fn is_in_library(result: &SearchResult, items: &[LibraryItem]) -> bool {
        find_in_library(result, items).is_some()
    }

    /// Adds a result to the library. Search caches are left untouched.
    ///
    /// # Errors
    /// - `LibraryError::AlreadyTracked` - The result is already in the library
    /// - `LibraryError::Unavailable` - Library backend could not be reached
    pub async fn track(
        &self,
        store: &dyn LibraryStore,
        result: &SearchResult,
        status: LibraryStatus,
    ) -> Result<LibraryItem, LibraryError> {
        let items = store.library_items().await?;
        if let Some(existing) = find_in_library(result, &items) {
            return Err(LibraryError::AlreadyTracked {
                id: existing.id.clone(),
                title: existing.title.clone(),
            });
        }

        let item = NewLibraryItem {
            id: result.id().to_string(),
            title: result.title().to_string(),
            category: result.category(),
        };
        let added = store.add_item(item, status).await?;
        tracing::info!("Tracking '{}' as {}", added.title, status.label());
        Ok(added)
    }

    /// Clears both cache layers, as when the search surface is reopened.
    pub fn reset(&self) {
        self.caches.clear();
    }

    /// Hit/miss statistics of the result cache.
    pub fn cache_statistics(&self) -> CacheStatistics {
        self.caches.results.statistics()
    }

    /// Configuration the service was built with.
    pub fn config(&self) -> &MedleyConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use medley_core::InMemoryLibrary;

    use super::*;
    use crate::adapters::SourceAdapter;
    use crate::errors::AdapterError;
    use crate::types::{Category, IdPrefix};

    #[derive(Debug)]
    struct CountingAdapter {
        category: Category,
        results: Vec<SearchResult>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SourceAdapter for CountingAdapter {
        fn category(&self) -> Category {
            self.category
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, AdapterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.clone())
        }
    }

    fn witcher() -> SearchResult {
        SearchResult::new(
            IdPrefix::Game,
            "3328",
            "The Witcher 3: Wild Hunt",
            "CD Projekt Red".to_string(),
            2015,
        )
        .unwrap()
    }

    fn service(calls: &Arc<AtomicUsize>) -> MediaSearchService {
        let adapter = |category, results| -> Arc<dyn SourceAdapter> {
            Arc::new(CountingAdapter {
                category,
                results,
                calls: Arc::clone(calls),
            })
        };
        let adapters = AdapterSet::new(
            adapter(Category::Games, vec![witcher()]),
            adapter(Category::Movies, Vec::new()),
            adapter(Category::Music, Vec::new()),
            adapter(Category::Books, Vec::new()),
        );
        MediaSearchService::with_adapters(MedleyConfig::for_testing(), adapters)
            .with_ranker(Ranker::new(2025))
    }

    fn tracked(id: &str, category: Category, status: LibraryStatus) -> LibraryItem {
        LibraryItem {
            id: id.to_string(),
            title: "The Witcher 3".to_string(),
            category,
            status,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_annotate_matches_unprefixed_ids() {
        let items = vec![tracked("3328", Category::Games, LibraryStatus::Completed)];

        let annotated = MediaSearchService::annotate(&[witcher()], &items);
        assert_eq!(annotated[0].tracked, Some(LibraryStatus::Completed));
        assert!(MediaSearchService::is_in_library(&witcher(), &items));

        let other_category = vec![tracked("3328", Category::Books, LibraryStatus::Planned)];
        assert!(!MediaSearchService::annotate(&[witcher()], &other_category)[0].is_tracked());
    }

    #[tokio::test]
    async fn test_reset_forces_fresh_search() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(&calls);

        service.search("witcher", CategoryFilter::All).await.unwrap();
        service.search("witcher", CategoryFilter::All).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let stats = service.cache_statistics();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.entries, 1);

        service.reset();
        let outcome = service.search("witcher", CategoryFilter::All).await.unwrap();
        assert!(!outcome.from_cache);
        assert_eq!(calls.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_tracking_keeps_cached_results() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = service(&calls);
        let library = InMemoryLibrary::new();

        let outcome = service.search("witcher", CategoryFilter::All).await.unwrap();
        let added = service
            .track(&library, &outcome.results[0], LibraryStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(added.id, "game-3328");

        let again = service.search("witcher", CategoryFilter::All).await.unwrap();
        assert!(again.from_cache);
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let error = service
            .track(&library, &again.results[0], LibraryStatus::Planned)
            .await
            .unwrap_err();
        assert!(matches!(error, LibraryError::AlreadyTracked { .. }));
    }
}

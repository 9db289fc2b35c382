//! Source adapters turning provider records into unified results.
//!
//! One adapter per category. Each wraps a provider catalog, bounds the
//! result count, enriches the top candidates with a detail lookup where the
//! provider needs one, and reports failures tagged with its category.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use medley_core::{MedleyConfig, SearchConfig};

use crate::cache::LookupCache;
use crate::errors::{AdapterError, AdapterErrorKind, ProviderError};
use crate::providers::{GoogleBooksClient, ItunesClient, RawgClient, TmdbClient};
use crate::types::{Category, CategoryFilter, SearchResult};

pub mod books;
pub mod games;
pub mod movies;
pub mod music;

pub use books::BooksAdapter;
pub use games::GamesAdapter;
pub use movies::MoviesAdapter;
pub use music::MusicAdapter;

/// Searches one category's provider.
#[async_trait]
pub trait SourceAdapter: Send + Sync + std::fmt::Debug {
    /// Category every produced result belongs to.
    fn category(&self) -> Category;

    /// Search the provider and normalize its records.
    ///
    /// An empty provider response is an empty list, not an error.
    ///
    /// # Errors
    /// - `AdapterErrorKind::InvalidQuery` - Query is empty after trimming
    /// - `AdapterErrorKind::RateLimited` - Provider quota exhausted
    /// - `AdapterErrorKind::Network` - Provider unreachable
    /// - `AdapterErrorKind::Malformed` - Provider response could not be decoded
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AdapterError>;
}

/// Per-adapter bounds on result count and detail lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterLimits {
    /// Results kept per provider search
    pub max_results: usize,
    /// Leading candidates that get a detail lookup
    pub enrich_top: usize,
}

impl AdapterLimits {
    /// Limits taken from the search configuration.
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            max_results: config.max_results_per_source,
            enrich_top: config.enrich_top,
        }
    }
}

impl Default for AdapterLimits {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

/// Exactly one adapter per category.
#[derive(Debug, Clone)]
pub struct AdapterSet {
    games: Arc<dyn SourceAdapter>,
    movies: Arc<dyn SourceAdapter>,
    music: Arc<dyn SourceAdapter>,
    books: Arc<dyn SourceAdapter>,
}

impl AdapterSet {
    /// Creates the set; an adapter reporting a different category is logged.
    pub fn new(
        games: Arc<dyn SourceAdapter>,
        movies: Arc<dyn SourceAdapter>,
        music: Arc<dyn SourceAdapter>,
        books: Arc<dyn SourceAdapter>,
    ) -> Self {
        let set = Self {
            games,
            movies,
            music,
            books,
        };
        for category in Category::ALL {
            let adapter = set.get(category);
            if adapter.category() != category {
                tracing::warn!(
                    "Adapter registered for {} reports category {}",
                    category,
                    adapter.category()
                );
            }
        }
        set
    }

    /// Builds the HTTP-backed adapters for every category.
    ///
    /// # Errors
    /// - `ProviderError::Network` - An HTTP client could not be built
    pub fn from_config(
        config: &MedleyConfig,
        lookups: Arc<LookupCache>,
    ) -> Result<Self, ProviderError> {
        let limits = AdapterLimits::from_config(&config.search);
        let providers = &config.providers;

        Ok(Self::new(
            Arc::new(GamesAdapter::new(
                RawgClient::new(providers)?,
                Arc::clone(&lookups),
                limits,
            )),
            Arc::new(MoviesAdapter::new(
                TmdbClient::new(providers)?,
                Arc::clone(&lookups),
                limits,
            )),
            Arc::new(MusicAdapter::new(ItunesClient::new(providers)?, limits)),
            Arc::new(BooksAdapter::new(GoogleBooksClient::new(providers)?, limits)),
        ))
    }

    /// Adapter for a category.
    pub fn get(&self, category: Category) -> &Arc<dyn SourceAdapter> {
        match category {
            Category::Games => &self.games,
            Category::Movies => &self.movies,
            Category::Music => &self.music,
            Category::Books => &self.books,
        }
    }

    /// Adapters selected by a filter, in the fixed category order.
    pub fn select(&self, filter: CategoryFilter) -> Vec<Arc<dyn SourceAdapter>> {
        filter
            .categories()
            .into_iter()
            .map(|category| Arc::clone(self.get(category)))
            .collect()
    }
}

/// Trimmed query, or `InvalidQuery` for the adapter's category.
pub(crate) fn require_query(category: Category, query: &str) -> Result<&str, AdapterError> {
    let query = query.trim();
    if query.is_empty() {
        Err(AdapterError::new(category, AdapterErrorKind::InvalidQuery))
    } else {
        Ok(query)
    }
}

/// Resolves creators for candidates through the detail lookup cache.
///
/// `targets` pairs each candidate's detail URL with the key `fetch` needs.
/// Every candidate reads the cache; on a miss only the first `enrich_top`
/// candidates are fetched, concurrently. Fetched outcomes are cached, including "none
/// found". A failed fetch is logged, left uncached and yields `None`.
pub(crate) async fn lookup_creators<K, F, Fut>(
    lookups: &LookupCache,
    category: Category,
    targets: Vec<(String, K)>,
    enrich_top: usize,
    fetch: F,
) -> Vec<Option<String>>
where
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<Option<String>, ProviderError>>,
{
    let fetch = &fetch;
    let lookups_for_targets = targets
        .into_iter()
        .enumerate()
        .map(move |(index, (url, key))| async move {
            if let Some(cached) = lookups.get(&url) {
                tracing::trace!("Detail cache hit for {}", url);
                return cached;
            }
            if index >= enrich_top {
                return None;
            }

            match fetch(key).await {
                Ok(creator) => {
                    lookups.insert(url, creator.clone());
                    creator
                }
                Err(e) => {
                    tracing::warn!("{} detail lookup failed for {}: {}", category, url, e);
                    None
                }
            }
        });

    join_all(lookups_for_targets).await
}

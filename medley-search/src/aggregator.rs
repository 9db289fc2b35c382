//! Fan-out / fan-in over the selected source adapters.
//!
//! Every selected adapter runs as its own task with its own timeout, and the
//! join point waits for all of them to settle. A failing source never cancels
//! its siblings; its error is reported next to the results of the others.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use medley_core::SearchConfig;

use crate::adapters::{AdapterSet, SourceAdapter};
use crate::cache::ResultCache;
use crate::errors::{AdapterError, AdapterErrorKind, SearchError};
use crate::fallback::FallbackPolicy;
use crate::ranker::Ranker;
use crate::types::{CategoryFilter, SearchResult};

/// Ranked results of one search plus the sources that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Deduplicated results in ranked order
    pub results: Arc<[SearchResult]>,
    /// One entry per failed source
    pub errors: Vec<AdapterError>,
    /// Served from the result cache without contacting any provider
    pub from_cache: bool,
}

impl SearchOutcome {
    /// Nothing to show, but only because sources failed.
    pub fn is_retryable(&self) -> bool {
        self.results.is_empty() && !self.errors.is_empty()
    }

    /// Some sources answered while others failed.
    pub fn is_partial(&self) -> bool {
        !self.results.is_empty() && !self.errors.is_empty()
    }
}

/// Runs searches across categories and merges them into one ranked list.
#[derive(Debug, Clone)]
pub struct Aggregator {
    adapters: AdapterSet,
    cache: Arc<ResultCache>,
    fallback: FallbackPolicy,
    ranker: Option<Ranker>,
    source_timeout: Duration,
    max_results: usize,
}

impl Aggregator {
    /// Creates an aggregator over `adapters` storing ranked lists in `cache`.
    pub fn new(
        adapters: AdapterSet,
        cache: Arc<ResultCache>,
        fallback: FallbackPolicy,
        config: &SearchConfig,
    ) -> Self {
        Self {
            adapters,
            cache,
            fallback,
            ranker: None,
            source_timeout: config.source_timeout,
            max_results: config.max_results_per_source,
        }
    }

    /// Pins the ranker instead of deriving it from today's date per search.
    pub fn with_ranker(mut self, ranker: Ranker) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Replaces the fallback policy.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Search every category selected by `filter`.
    ///
    /// # Errors
    /// - `SearchError::EmptyQuery` - Query is empty after trimming
    /// - `SearchError::AllSourcesFailed` - Every source failed and no fallback data matched
    pub async fn aggregate(
        &self,
        query: &str,
        filter: CategoryFilter,
    ) -> Result<SearchOutcome, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        if let Some(results) = self.cache.get(filter, query) {
            return Ok(SearchOutcome {
                results,
                errors: Vec::new(),
                from_cache: true,
            });
        }

        let started = Instant::now();
        let adapters = self.adapters.select(filter);
        let selected = adapters.len();
        let settled = self.fan_out(adapters, query).await;

        let mut merged = Vec::new();
        let mut errors = Vec::new();
        let mut fallback_items = 0;

        for outcome in settled {
            match outcome {
                Ok(results) => merged.extend(results),
                Err(error) => {
                    tracing::warn!("Search for '{}': {}", query, error);
                    if self.fallback.applies_to(&error) {
                        let items = self
                            .fallback
                            .fallback_for(error.category, query, self.max_results);
                        tracing::warn!(
                            "Using {} fallback {} results for '{}'",
                            items.len(),
                            error.category,
                            query
                        );
                        fallback_items += items.len();
                        merged.extend(items);
                    }
                    errors.push(error);
                }
            }
        }

        if errors.len() == selected && fallback_items == 0 {
            tracing::warn!("All {} sources failed for '{}'", selected, query);
            return Err(SearchError::AllSourcesFailed {
                query: query.to_string(),
                failures: errors,
            });
        }

        let ranker = self.ranker.unwrap_or_else(Ranker::for_current_year);
        let ranked: Arc<[SearchResult]> = ranker.rank(query, dedup_by_id(merged)).into();
        let results = self.cache.set(filter, query, ranked);

        tracing::info!(
            "Search for '{}' ({}) finished in {:?}: {} results, {} failed sources",
            query,
            filter,
            started.elapsed(),
            results.len(),
            errors.len()
        );

        Ok(SearchOutcome {
            results,
            errors,
            from_cache: false,
        })
    }

    /// Runs each adapter on its own task and returns the outcomes in
    /// adapter order once all of them settled.
    async fn fan_out(
        &self,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        query: &str,
    ) -> Vec<Result<Vec<SearchResult>, AdapterError>> {
        let source_timeout = self.source_timeout;
        let (categories, tasks): (Vec<_>, Vec<_>) = adapters
            .into_iter()
            .map(|adapter| {
                let category = adapter.category();
                let query = query.to_string();
                let task = tokio::spawn(async move {
                    let started = Instant::now();
                    let outcome = match tokio::time::timeout(source_timeout, adapter.search(&query))
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => Err(AdapterError::new(
                            category,
                            AdapterErrorKind::Timeout {
                                millis: source_timeout.as_millis() as u64,
                            },
                        )),
                    };
                    tracing::debug!("{} source settled in {:?}", category, started.elapsed());
                    outcome
                });
                (category, task)
            })
            .unzip();

        join_all(tasks)
            .await
            .into_iter()
            .zip(categories)
            .map(|(joined, category)| {
                joined.unwrap_or_else(|e| {
                    Err(AdapterError::new(
                        category,
                        AdapterErrorKind::Crashed {
                            reason: e.to_string(),
                        },
                    ))
                })
            })
            .collect()
    }
}

/// Keeps the first occurrence of every id.
fn dedup_by_id(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|result| seen.insert(result.id().to_string()))
        .collect()
}

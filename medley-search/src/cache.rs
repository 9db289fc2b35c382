//! Session-lifetime search caches
//!
//! Two independent layers: ranked result lists keyed by filter and query, and
//! provider sub-lookups keyed by the provider detail URL. Entries are only
//! ever added, never updated in place, and live until the owning session
//! clears them. There is no expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::types::{CategoryFilter, SearchResult};

/// Cache key for a ranked result list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Categories the list was searched in
    pub filter: CategoryFilter,
    /// Trimmed, lowercased query
    pub query: String,
}

impl CacheKey {
    /// Builds the key with the query trimmed and lowercased.
    pub fn new(filter: CategoryFilter, query: &str) -> Self {
        Self {
            filter,
            query: query.trim().to_lowercase(),
        }
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatistics {
    /// Number of cached result lists
    pub entries: usize,
    /// Lookups answered from the cache
    pub hit_count: u64,
    /// Lookups that found nothing
    pub miss_count: u64,
    /// Hits as a fraction of all lookups
    pub hit_rate: f64,
}

impl CacheStatistics {
    /// Calculate hit rate as a fraction of all lookups
    pub fn calculate_hit_rate(hit_count: u64, miss_count: u64) -> f64 {
        if hit_count + miss_count == 0 {
            0.0
        } else {
            (hit_count as f64) / ((hit_count + miss_count) as f64)
        }
    }
}

/// Ranked result lists per (filter, query).
///
/// A hit hands back the very list that was stored, so repeated searches
/// observe the same order without touching any provider.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<CacheKey, Arc<[SearchResult]>>>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl ResultCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get ranked results for a filter and query
    pub fn get(&self, filter: CategoryFilter, query: &str) -> Option<Arc<[SearchResult]>> {
        let key = CacheKey::new(filter, query);
        let entry = self.entries.read().get(&key).cloned();

        match entry {
            Some(results) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    "Result cache hit for '{}' ({}): {} results",
                    key.query,
                    key.filter,
                    results.len()
                );
                Some(results)
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Result cache miss for '{}' ({})", key.query, key.filter);
                None
            }
        }
    }

    /// Store ranked results; an existing entry for the same key is kept.
    ///
    /// Returns the list that is cached afterwards, which is the earlier one
    /// when a concurrent search for the same key stored first.
    pub fn set(
        &self,
        filter: CategoryFilter,
        query: &str,
        results: Arc<[SearchResult]>,
    ) -> Arc<[SearchResult]> {
        let key = CacheKey::new(filter, query);
        Arc::clone(self.entries.write().entry(key).or_insert(results))
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        self.entries.write().clear();
        self.hit_count.store(0, Ordering::Relaxed);
        self.miss_count.store(0, Ordering::Relaxed);
    }

    /// Number of cached result lists.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Get cache statistics
    pub fn statistics(&self) -> CacheStatistics {
        let hit_count = self.hit_count.load(Ordering::Relaxed);
        let miss_count = self.miss_count.load(Ordering::Relaxed);

        CacheStatistics {
            entries: self.len(),
            hit_count,
            miss_count,
            hit_rate: CacheStatistics::calculate_hit_rate(hit_count, miss_count),
        }
    }
}

/// Provider detail lookups keyed by raw provider URL.
///
/// The stored value is the creator the detail call yielded; `None` records
/// that the provider was asked and had nothing, so it is not asked again.
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: RwLock<HashMap<String, Option<String>>>,
}

impl LookupCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Outer `None` means never looked up.
    pub fn get(&self, url: &str) -> Option<Option<String>> {
        self.entries.read().get(url).cloned()
    }

    /// Record a lookup outcome; the first outcome for a URL wins.
    pub fn insert(&self, url: String, value: Option<String>) {
        self.entries.write().entry(url).or_insert(value);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of cached lookups.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Both cache layers of one search session.
#[derive(Debug, Clone, Default)]
pub struct SearchCaches {
    /// Ranked lists per filter and query
    pub results: Arc<ResultCache>,
    /// Detail lookups shared by the enriching adapters
    pub lookups: Arc<LookupCache>,
}

impl SearchCaches {
    /// Creates two empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears both layers, as when the search surface is reopened.
    pub fn clear(&self) {
        self.results.clear();
        self.lookups.clear();
        tracing::debug!("Search caches cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, IdPrefix};

    fn ranked(titles: &[&str]) -> Arc<[SearchResult]> {
        titles
            .iter()
            .enumerate()
            .map(|(index, title)| {
                SearchResult::new(
                    IdPrefix::Game,
                    &index.to_string(),
                    title,
                    "Nintendo".to_string(),
                    2017,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let cache = ResultCache::new();
        cache.set(CategoryFilter::All, "Mario", ranked(&["Mario Kart 8"]));

        let hit = cache.get(CategoryFilter::All, "  mARIO ").unwrap();
        assert_eq!(hit[0].title(), "Mario Kart 8");
    }

    #[test]
    fn test_filters_are_separate_entries() {
        let cache = ResultCache::new();
        cache.set(CategoryFilter::All, "zelda", ranked(&["Breath of the Wild"]));

        assert!(
            cache
                .get(CategoryFilter::Only(Category::Games), "zelda")
                .is_none()
        );
        assert!(cache.get(CategoryFilter::All, "zelda").is_some());
    }

    #[test]
    fn test_hit_returns_same_allocation() {
        let cache = ResultCache::new();
        let stored = ranked(&["Hollow Knight", "Hollow Knight: Silksong"]);
        cache.set(CategoryFilter::All, "hollow", Arc::clone(&stored));

        let first = cache.get(CategoryFilter::All, "hollow").unwrap();
        let second = cache.get(CategoryFilter::All, "HOLLOW").unwrap();
        assert!(Arc::ptr_eq(&first, &stored));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_entries_are_not_replaced() {
        let cache = ResultCache::new();
        cache.set(CategoryFilter::All, "doom", ranked(&["Doom"]));
        let kept = cache.set(CategoryFilter::All, "doom", ranked(&["Doom Eternal"]));
        assert_eq!(kept[0].title(), "Doom");

        let hit = cache.get(CategoryFilter::All, "doom").unwrap();
        assert_eq!(hit[0].title(), "Doom");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_statistics_and_clear() {
        let cache = ResultCache::new();
        cache.set(CategoryFilter::All, "halo", ranked(&["Halo"]));
        let _ = cache.get(CategoryFilter::All, "halo");
        let _ = cache.get(CategoryFilter::All, "portal");

        let stats = cache.statistics();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_rate, 0.5);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.statistics().hit_count, 0);
    }

    #[test]
    fn test_lookup_cache_remembers_empty_outcome() {
        let lookups = LookupCache::new();
        assert_eq!(lookups.get("https://api.rawg.io/api/games/28"), None);

        lookups.insert("https://api.rawg.io/api/games/28".to_string(), None);
        assert_eq!(lookups.get("https://api.rawg.io/api/games/28"), Some(None));

        lookups.insert(
            "https://api.rawg.io/api/games/28".to_string(),
            Some("Rockstar Games".to_string()),
        );
        assert_eq!(lookups.get("https://api.rawg.io/api/games/28"), Some(None));
    }
}

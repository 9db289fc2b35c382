//! Centralized configuration for Medley.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

use crate::media::Category;

/// Central configuration for all Medley components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct MedleyConfig {
    pub search: SearchConfig,
    pub providers: ProviderConfig,
    pub fallback: FallbackConfig,
}

/// Search pipeline tuning.
///
/// Controls input debouncing, per-provider result bounds and the two-phase
/// enrichment budget.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search runs
    pub debounce_delay: Duration,
    /// Queries shorter than this clear results instead of searching
    pub min_query_chars: usize,
    /// Maximum results kept per provider
    pub max_results_per_source: usize,
    /// Number of top candidates enriched with a detail lookup
    pub enrich_top: usize,
    /// Upper bound on a single adapter's search, detail calls included
    pub source_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_delay: Duration::from_millis(1000),
            min_query_chars: 2,
            max_results_per_source: 8,
            enrich_top: 3,
            source_timeout: Duration::from_secs(10),
        }
    }
}

/// Provider endpoints and credentials.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// RAWG games API base URL
    pub rawg_base_url: String,
    /// RAWG API key
    pub rawg_api_key: Option<String>,
    /// TMDB API base URL
    pub tmdb_base_url: String,
    /// TMDB API key
    pub tmdb_api_key: Option<String>,
    /// iTunes Search API base URL
    pub itunes_base_url: String,
    /// Google Books API base URL
    pub google_books_base_url: String,
    /// Google Books API key
    pub google_books_api_key: Option<String>,
    /// HTTP request timeout for every provider call
    pub request_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rawg_base_url: "https://api.rawg.io/api".to_string(),
            rawg_api_key: None,
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_api_key: None,
            itunes_base_url: "https://itunes.apple.com".to_string(),
            google_books_base_url: "https://www.googleapis.com/books/v1".to_string(),
            google_books_api_key: None,
            request_timeout: Duration::from_secs(8),
            user_agent: "medley/0.1.0",
        }
    }
}

/// Which categories substitute built-in sample data when their provider is
/// rate limited.
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub games: bool,
    pub movies: bool,
    pub music: bool,
    pub books: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            games: true,
            movies: false,
            music: false,
            books: false,
        }
    }
}

impl FallbackConfig {
    /// Whether fallback data is enabled for a category.
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Games => self.games,
            Category::Movies => self.movies,
            Category::Music => self.music,
            Category::Books => self.books,
        }
    }

    /// Disables fallback data for every category.
    pub fn disabled() -> Self {
        Self {
            games: false,
            movies: false,
            music: false,
            books: false,
        }
    }
}

impl MedleyConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup.
    ///
    /// Same keys as [`MedleyConfig::from_env`]; unparsable values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        // Search configuration overrides
        if let Some(millis) = lookup("MEDLEY_DEBOUNCE_MS").and_then(|v| v.parse::<u64>().ok()) {
            config.search.debounce_delay = Duration::from_millis(millis);
        }

        if let Some(count) = lookup("MEDLEY_MAX_RESULTS")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&count| count > 0)
        {
            config.search.max_results_per_source = count;
        }

        if let Some(count) = lookup("MEDLEY_ENRICH_TOP").and_then(|v| v.parse::<usize>().ok()) {
            config.search.enrich_top = count;
        }

        if let Some(seconds) =
            lookup("MEDLEY_SOURCE_TIMEOUT").and_then(|v| v.parse::<u64>().ok())
        {
            config.search.source_timeout = Duration::from_secs(seconds);
        }

        // Provider credentials
        if let Some(key) = lookup("MEDLEY_RAWG_API_KEY") {
            config.providers.rawg_api_key = Some(key);
        }

        if let Some(key) = lookup("MEDLEY_TMDB_API_KEY") {
            config.providers.tmdb_api_key = Some(key);
        }

        if let Some(key) = lookup("MEDLEY_GOOGLE_BOOKS_API_KEY") {
            config.providers.google_books_api_key = Some(key);
        }

        // Fallback datasets
        if let Some(enabled) = lookup("MEDLEY_GAMES_FALLBACK") {
            config.fallback.games = enabled.parse().unwrap_or(true);
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Short timers so paused-clock tests stay readable.
    pub fn for_testing() -> Self {
        Self {
            search: SearchConfig {
                debounce_delay: Duration::from_millis(100),
                source_timeout: Duration::from_secs(2),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

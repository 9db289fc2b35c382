//! Medley Search - Cross-domain media search
//!
//! Fans one free-text query out to the games, movies/TV, music and books
//! providers, normalizes their records into a single result model, tolerates
//! partial provider failure, memoizes results per session and orders the
//! merged list with a fixed, explainable comparator chain.

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]

pub mod adapters;
pub mod aggregator;
pub mod cache;
pub mod debounce;
pub mod errors;
pub mod fallback;
pub mod normalizer;
pub mod providers;
pub mod ranker;
pub mod service;
pub mod session;
pub mod types;

// Re-export main types
pub use adapters::{
    AdapterLimits, AdapterSet, BooksAdapter, GamesAdapter, MoviesAdapter, MusicAdapter,
    SourceAdapter,
};
pub use aggregator::{Aggregator, SearchOutcome};
pub use cache::{CacheStatistics, LookupCache, ResultCache, SearchCaches};
pub use debounce::Debouncer;
pub use errors::{AdapterError, AdapterErrorKind, ProviderError, SearchError};
pub use fallback::FallbackPolicy;
pub use normalizer::{find_in_library, resolve_creator, same_item, strip_category_prefix};
pub use ranker::Ranker;
pub use service::{AnnotatedResult, MediaSearchService};
pub use session::{SearchSession, SearchState};
pub use types::{Category, CategoryFilter, IdPrefix, SearchResult};

/// Convenience type alias for Results with SearchError.
pub type Result<T> = std::result::Result<T, SearchError>;

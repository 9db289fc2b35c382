//! Debounced search session driven by keystrokes.
//!
//! Every query change bumps a generation counter. A search only publishes
//! its outcome if no newer change arrived while it ran, so the state always
//! reflects the latest input even though superseded searches are not aborted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use medley_core::SearchConfig;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::aggregator::SearchOutcome;
use crate::debounce::Debouncer;
use crate::errors::SearchError;
use crate::service::MediaSearchService;
use crate::types::CategoryFilter;

/// What the search surface should currently show.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// No query long enough to search
    Idle,
    /// Search scheduled or running
    Loading {
        /// Query being searched
        query: String,
        /// Categories being searched
        filter: CategoryFilter,
    },
    /// Search finished with results or partial failures
    Ready {
        /// Query that was searched
        query: String,
        /// Categories that were searched
        filter: CategoryFilter,
        /// Ranked results and failed sources
        outcome: SearchOutcome,
    },
    /// Search produced nothing usable
    Failed {
        /// Query that was searched
        query: String,
        /// Categories that were searched
        filter: CategoryFilter,
        /// Why the search failed
        error: SearchError,
    },
    /// Search surface dismissed
    Closed,
}

/// Turns a stream of query edits into at most one search per quiet period.
#[derive(Debug)]
pub struct SearchSession {
    service: Arc<MediaSearchService>,
    debouncer: Mutex<Debouncer>,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
    debounce_delay: Duration,
    min_query_chars: usize,
}

impl SearchSession {
    /// Creates an idle session over `service`.
    pub fn new(service: Arc<MediaSearchService>, config: &SearchConfig) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            service,
            debouncer: Mutex::new(Debouncer::new()),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            debounce_delay: config.debounce_delay,
            min_query_chars: config.min_query_chars,
        }
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Handles an edit of the query or the category filter.
    ///
    /// Short queries clear the results right away. Anything else schedules a
    /// search once input has been quiet for the debounce delay. Must be
    /// called from within a tokio runtime.
    pub fn on_query_changed(&self, query: &str, filter: CategoryFilter) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim();

        if query.chars().count() < self.min_query_chars {
            self.debouncer.lock().cancel();
            self.state.send_replace(SearchState::Idle);
            return;
        }

        let query = query.to_string();
        let service = Arc::clone(&self.service);
        let latest = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);

        self.debouncer.lock().schedule(self.debounce_delay, async move {
            let loading = SearchState::Loading {
                query: query.clone(),
                filter,
            };
            if !publish_if_current(&state, &latest, generation, loading) {
                return;
            }

            let outcome = service.search(&query, filter).await;

            let next = match outcome {
                Ok(outcome) => SearchState::Ready {
                    query: query.clone(),
                    filter,
                    outcome,
                },
                Err(error) => SearchState::Failed {
                    query: query.clone(),
                    filter,
                    error,
                },
            };
            if !publish_if_current(&state, &latest, generation, next) {
                tracing::debug!("Discarding results for superseded query '{}'", query);
            }
        });
    }

    /// Dismisses the search surface.
    ///
    /// Pending and in-flight searches are dropped and both caches are
    /// cleared. A later query change starts over.
    pub fn close(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.debouncer.lock().cancel();
        self.service.reset();
        self.state.send_replace(SearchState::Closed);
    }
}

/// Publishes `next` only while `generation` is still the latest one.
///
/// The check runs under the channel's write lock. Query changes and
/// `close()` bump the generation before they publish, so a superseded search
/// can never overwrite their state.
fn publish_if_current(
    state: &watch::Sender<SearchState>,
    latest: &AtomicU64,
    generation: u64,
    next: SearchState,
) -> bool {
    state.send_if_modified(|current| {
        if latest.load(Ordering::SeqCst) == generation {
            *current = next;
            true
        } else {
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use medley_core::MedleyConfig;
    use parking_lot::Mutex as SyncMutex;

    use super::*;
    use crate::adapters::{AdapterSet, SourceAdapter};
    use crate::errors::AdapterError;
    use crate::ranker::Ranker;
    use crate::types::{Category, IdPrefix, SearchResult};

    /// Games source that records queries and answers after a delay.
    #[derive(Debug)]
    struct RecordingAdapter {
        category: Category,
        latency: Duration,
        queries: Arc<SyncMutex<Vec<String>>>,
    }

    #[async_trait]
    impl SourceAdapter for RecordingAdapter {
        fn category(&self) -> Category {
            self.category
        }

        async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AdapterError> {
            if self.category == Category::Games {
                self.queries.lock().push(query.to_string());
            }
            tokio::time::sleep(self.latency).await;
            if self.category != Category::Games {
                return Ok(Vec::new());
            }
            Ok(vec![
                SearchResult::new(
                    IdPrefix::Game,
                    &query.len().to_string(),
                    &format!("Super {query}"),
                    "Nintendo".to_string(),
                    2017,
                )
                .unwrap(),
            ])
        }
    }

    struct Fixture {
        session: SearchSession,
        queries: Arc<SyncMutex<Vec<String>>>,
    }

    fn fixture(latency: Duration) -> Fixture {
        fixture_with(latency, MedleyConfig::for_testing().search)
    }

    fn fixture_with(latency: Duration, search: SearchConfig) -> Fixture {
        let queries = Arc::new(SyncMutex::new(Vec::new()));
        let adapter = |category| -> Arc<dyn SourceAdapter> {
            Arc::new(RecordingAdapter {
                category,
                latency,
                queries: Arc::clone(&queries),
            })
        };
        let adapters = AdapterSet::new(
            adapter(Category::Games),
            adapter(Category::Movies),
            adapter(Category::Music),
            adapter(Category::Books),
        );
        let config = MedleyConfig {
            search: search.clone(),
            ..MedleyConfig::for_testing()
        };
        let service =
            MediaSearchService::with_adapters(config, adapters).with_ranker(Ranker::new(2025));

        Fixture {
            session: SearchSession::new(Arc::new(service), &search),
            queries,
        }
    }

    /// Waits for the next search to publish its outcome.
    async fn next_settled(receiver: &mut watch::Receiver<SearchState>) -> SearchState {
        loop {
            receiver.changed().await.unwrap();
            let state = receiver.borrow_and_update().clone();
            if matches!(state, SearchState::Ready { .. } | SearchState::Failed { .. }) {
                return state;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_collapses_into_one_search() {
        let fixture = fixture(Duration::from_millis(10));
        let mut receiver = fixture.session.subscribe();

        for query in ["m", "ma", "mar", "mario"] {
            fixture.session.on_query_changed(query, CategoryFilter::All);
            tokio::time::sleep(Duration::from_millis(30)).await;
        }

        let state = next_settled(&mut receiver).await;
        match state {
            SearchState::Ready { query, outcome, .. } => {
                assert_eq!(query, "mario");
                assert_eq!(outcome.results[0].title(), "Super mario");
            }
            other => panic!("unexpected state: {other:?}"),
        }
        assert_eq!(*fixture.queries.lock(), vec!["mario".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_clears_immediately() {
        let fixture = fixture(Duration::from_millis(10));

        fixture.session.on_query_changed("zelda", CategoryFilter::All);
        fixture.session.on_query_changed(" z ", CategoryFilter::All);
        assert_eq!(fixture.session.state(), SearchState::Idle);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(fixture.queries.lock().is_empty());
        assert_eq!(fixture.session.state(), SearchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_search_is_discarded() {
        // Searches take longer than the debounce delay
        let fixture = fixture(Duration::from_millis(500));
        let mut receiver = fixture.session.subscribe();

        fixture.session.on_query_changed("halo", CategoryFilter::All);
        // Let the first search start, then type again while it runs
        tokio::time::sleep(Duration::from_millis(150)).await;
        fixture.session.on_query_changed("hades", CategoryFilter::All);

        let state = next_settled(&mut receiver).await;
        match state {
            SearchState::Ready { query, .. } => assert_eq!(query, "hades"),
            other => panic!("unexpected state: {other:?}"),
        }
        assert_eq!(
            *fixture.queries.lock(),
            vec!["halo".to_string(), "hades".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_and_publishes_closed() {
        let fixture = fixture(Duration::from_millis(10));

        fixture.session.on_query_changed("portal", CategoryFilter::All);
        fixture.session.close();
        assert_eq!(fixture.session.state(), SearchState::Closed);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(fixture.queries.lock().is_empty());
        assert_eq!(fixture.session.state(), SearchState::Closed);
    }

    #[test]
    fn test_stale_generation_does_not_publish() {
        let (state, receiver) = watch::channel(SearchState::Closed);
        let latest = AtomicU64::new(7);

        let stale = SearchState::Loading {
            query: "halo".to_string(),
            filter: CategoryFilter::All,
        };
        assert!(!publish_if_current(&state, &latest, 6, stale));
        assert_eq!(*receiver.borrow(), SearchState::Closed);
        assert!(!receiver.has_changed().unwrap());

        assert!(publish_if_current(&state, &latest, 7, SearchState::Idle));
        assert_eq!(*receiver.borrow(), SearchState::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_close_racing_search_completion_stays_closed() {
        let search = SearchConfig {
            debounce_delay: Duration::from_millis(1),
            ..MedleyConfig::for_testing().search
        };
        let fixture = fixture_with(Duration::ZERO, search);

        for round in 0..50u64 {
            fixture.session.on_query_changed("metroid", CategoryFilter::All);
            // Close at varying points around search completion
            tokio::time::sleep(Duration::from_micros(200 * (round % 15))).await;
            fixture.session.close();

            tokio::time::sleep(Duration::from_millis(5)).await;
            assert_eq!(
                fixture.session.state(),
                SearchState::Closed,
                "round {round} published after close"
            );
        }
    }
}

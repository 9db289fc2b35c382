//! Shared fixtures: scripted sources, service builders and a stub HTTP server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use medley_core::MedleyConfig;
use medley_search::{
    AdapterError, AdapterErrorKind, AdapterSet, Category, IdPrefix, MediaSearchService, Ranker,
    SearchResult, SourceAdapter,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Ranking year used by every scenario.
pub const RANKING_YEAR: i32 = 2025;

/// Routes test logs through the test harness writer. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("medley_search=debug")
        .with_test_writer()
        .try_init();
}

/// Source that replays a fixed answer and counts calls.
#[derive(Debug)]
pub struct ScriptedSource {
    category: Category,
    answer: Result<Vec<SearchResult>, AdapterErrorKind>,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn returning(category: Category, results: Vec<SearchResult>) -> Arc<Self> {
        Arc::new(Self {
            category,
            answer: Ok(results),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(category: Category, kind: AdapterErrorKind) -> Arc<Self> {
        Arc::new(Self {
            category,
            answer: Err(kind),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn empty(category: Category) -> Arc<Self> {
        Self::returning(category, Vec::new())
    }

    pub fn slow(category: Category, results: Vec<SearchResult>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            category,
            answer: Ok(results),
            latency,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for ScriptedSource {
    fn category(&self) -> Category {
        self.category
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.answer
            .clone()
            .map_err(|kind| AdapterError::new(self.category, kind))
    }
}

/// The four sources of a service, kept for call assertions.
pub struct Sources {
    pub games: Arc<ScriptedSource>,
    pub movies: Arc<ScriptedSource>,
    pub music: Arc<ScriptedSource>,
    pub books: Arc<ScriptedSource>,
}

impl Sources {
    pub fn adapter_set(&self) -> AdapterSet {
        AdapterSet::new(
            Arc::clone(&self.games) as Arc<dyn SourceAdapter>,
            Arc::clone(&self.movies) as Arc<dyn SourceAdapter>,
            Arc::clone(&self.music) as Arc<dyn SourceAdapter>,
            Arc::clone(&self.books) as Arc<dyn SourceAdapter>,
        )
    }

    pub fn service(&self, config: MedleyConfig) -> MediaSearchService {
        MediaSearchService::with_adapters(config, self.adapter_set())
            .with_ranker(Ranker::new(RANKING_YEAR))
    }

    pub fn total_calls(&self) -> usize {
        self.games.calls() + self.movies.calls() + self.music.calls() + self.books.calls()
    }
}

pub fn item(prefix: IdPrefix, id: &str, title: &str, creator: &str, year: i32) -> SearchResult {
    SearchResult::new(prefix, id, title, creator.to_string(), year)
        .unwrap_or_else(|e| panic!("invalid fixture {title}: {e}"))
}

pub fn titles(results: &[SearchResult]) -> Vec<&str> {
    results.iter().map(SearchResult::title).collect()
}

/// Serves one canned HTTP response per connection on a local port.
///
/// Returns the base URL to point a provider client at.
pub async fn stub_server(status_line: &'static str, body: &'static str) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buffer = [0u8; 1024];
                loop {
                    match socket.read(&mut buffer).await {
                        Ok(0) | Err(_) => return,
                        Ok(read) => request.extend_from_slice(&buffer[..read]),
                    }
                    if request.windows(4).any(|window| window == b"\r\n\r\n") {
                        break;
                    }
                }

                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Ok(format!("http://{address}"))
}

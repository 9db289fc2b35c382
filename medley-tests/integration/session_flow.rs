//! Keystroke-driven sessions with paused time.

use std::sync::Arc;
use std::time::Duration;

use medley_core::MedleyConfig;
use medley_search::{Category, CategoryFilter, IdPrefix, SearchSession, SearchState};
use tokio::sync::watch;

use crate::support::{ScriptedSource, Sources, item};

fn mario_sources(latency: Duration) -> Sources {
    Sources {
        games: ScriptedSource::slow(
            Category::Games,
            vec![item(IdPrefix::Game, "22511", "Super Mario Odyssey", "Nintendo EPD", 2017)],
            latency,
        ),
        movies: ScriptedSource::empty(Category::Movies),
        music: ScriptedSource::empty(Category::Music),
        books: ScriptedSource::empty(Category::Books),
    }
}

async fn settled(receiver: &mut watch::Receiver<SearchState>) -> anyhow::Result<SearchState> {
    loop {
        receiver.changed().await?;
        let state = receiver.borrow_and_update().clone();
        if matches!(state, SearchState::Ready { .. } | SearchState::Failed { .. }) {
            return Ok(state);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_keystrokes_collapse_into_single_aggregation() -> anyhow::Result<()> {
    let sources = mario_sources(Duration::from_millis(20));
    let config = MedleyConfig::default();
    let session = SearchSession::new(
        Arc::new(sources.service(config.clone())),
        &config.search,
    );
    let mut receiver = session.subscribe();

    for query in ["m", "ma", "mar", "mario"] {
        session.on_query_changed(query, CategoryFilter::All);
        tokio::time::sleep(Duration::from_millis(150)).await;
    }

    let SearchState::Ready { query, outcome, .. } = settled(&mut receiver).await? else {
        anyhow::bail!("search did not succeed");
    };
    assert_eq!(query, "mario");
    assert_eq!(outcome.results[0].title(), "Super Mario Odyssey");
    assert_eq!(sources.games.calls(), 1);
    assert_eq!(sources.total_calls(), 4);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_filter_change_restarts_quiet_period() -> anyhow::Result<()> {
    let sources = mario_sources(Duration::ZERO);
    let config = MedleyConfig::for_testing();
    let session = SearchSession::new(
        Arc::new(sources.service(config.clone())),
        &config.search,
    );
    let mut receiver = session.subscribe();

    session.on_query_changed("mario", CategoryFilter::All);
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.on_query_changed("mario", CategoryFilter::Only(Category::Games));

    let SearchState::Ready { filter, .. } = settled(&mut receiver).await? else {
        anyhow::bail!("search did not succeed");
    };
    assert_eq!(filter, CategoryFilter::Only(Category::Games));
    assert_eq!(sources.total_calls(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_reopened_session_searches_again() -> anyhow::Result<()> {
    let sources = mario_sources(Duration::ZERO);
    let config = MedleyConfig::for_testing();
    let session = SearchSession::new(
        Arc::new(sources.service(config.clone())),
        &config.search,
    );
    let mut receiver = session.subscribe();

    session.on_query_changed("mario", CategoryFilter::All);
    settled(&mut receiver).await?;
    assert_eq!(sources.games.calls(), 1);

    session.close();
    assert_eq!(session.state(), SearchState::Closed);

    session.on_query_changed("mario", CategoryFilter::All);
    let SearchState::Ready { outcome, .. } = settled(&mut receiver).await? else {
        anyhow::bail!("search did not succeed");
    };
    // Caches were cleared on close
    assert!(!outcome.from_cache);
    assert_eq!(sources.games.calls(), 2);
    Ok(())
}

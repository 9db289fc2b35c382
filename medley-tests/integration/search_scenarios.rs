//! End-to-end search scenarios through `MediaSearchService`.

use medley_core::{FallbackConfig, MedleyConfig};
use medley_search::{
    AdapterErrorKind, Category, CategoryFilter, FallbackPolicy, IdPrefix, SearchError,
};
use tokio_test::assert_ok;

use crate::support::{ScriptedSource, Sources, init_test_tracing, item, titles};

#[tokio::test]
async fn test_mario_ranks_newer_title_match_first() -> anyhow::Result<()> {
    init_test_tracing();
    let sources = Sources {
        games: ScriptedSource::returning(
            Category::Games,
            vec![
                item(IdPrefix::Game, "22511", "Super Mario Odyssey", "Nintendo EPD", 2017),
                item(IdPrefix::Game, "900", "Mario Kart 8", "Nintendo EPD", 2024),
            ],
        ),
        movies: ScriptedSource::returning(
            Category::Movies,
            vec![item(IdPrefix::Movie, "1", "Luigi's Mansion", "Mario Bava", 1972)],
        ),
        music: ScriptedSource::empty(Category::Music),
        books: ScriptedSource::empty(Category::Books),
    };
    let service = sources.service(MedleyConfig::for_testing());

    let outcome = service.search("Mario", CategoryFilter::All).await?;

    assert_eq!(
        titles(&outcome.results),
        ["Mario Kart 8", "Super Mario Odyssey", "Luigi's Mansion"]
    );
    assert!(outcome.errors.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_games_rate_limit_falls_back_to_sample_data() -> anyhow::Result<()> {
    init_test_tracing();
    let sources = Sources {
        games: ScriptedSource::failing(Category::Games, AdapterErrorKind::RateLimited),
        movies: ScriptedSource::returning(
            Category::Movies,
            vec![item(
                IdPrefix::Movie,
                "502356",
                "The Super Mario Bros. Movie",
                "Aaron Horvath",
                2023,
            )],
        ),
        music: ScriptedSource::empty(Category::Music),
        books: ScriptedSource::empty(Category::Books),
    };
    let two_games = vec![
        item(IdPrefix::Game, "fallback-1", "Super Mario Odyssey", "Nintendo EPD", 2017),
        item(IdPrefix::Game, "fallback-2", "Mario Kart 8 Deluxe", "Nintendo EPD", 2017),
    ];
    let service = sources
        .service(MedleyConfig::for_testing())
        .with_fallback(FallbackPolicy::disabled().with_dataset(Category::Games, two_games));

    let outcome = service.search("mario", CategoryFilter::All).await?;

    assert_eq!(
        titles(&outcome.results),
        [
            "The Super Mario Bros. Movie",
            "Super Mario Odyssey",
            "Mario Kart 8 Deluxe"
        ]
    );
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].category, Category::Games);
    assert_eq!(outcome.errors[0].reason(), "rate-limit");
    Ok(())
}

#[tokio::test]
async fn test_disabled_fallback_reports_failure_only() -> anyhow::Result<()> {
    let sources = Sources {
        games: ScriptedSource::failing(Category::Games, AdapterErrorKind::RateLimited),
        movies: ScriptedSource::empty(Category::Movies),
        music: ScriptedSource::empty(Category::Music),
        books: ScriptedSource::empty(Category::Books),
    };
    let config = MedleyConfig {
        fallback: FallbackConfig::disabled(),
        ..MedleyConfig::for_testing()
    };
    let service = sources.service(config);

    let outcome = service.search("mario", CategoryFilter::All).await?;

    assert!(outcome.results.is_empty());
    assert!(outcome.is_retryable());
    Ok(())
}

#[tokio::test]
async fn test_single_category_failure_is_aggregate_failure() {
    let sources = Sources {
        games: ScriptedSource::empty(Category::Games),
        movies: ScriptedSource::empty(Category::Movies),
        music: ScriptedSource::empty(Category::Music),
        books: ScriptedSource::failing(Category::Books, AdapterErrorKind::Provider { status: 500 }),
    };
    let service = sources.service(MedleyConfig::for_testing());

    let error = service
        .search("dune", CategoryFilter::Only(Category::Books))
        .await
        .unwrap_err();

    assert!(error.is_retryable());
    assert!(matches!(
        error,
        SearchError::AllSourcesFailed { ref failures, .. } if failures.len() == 1
    ));
    assert_eq!(sources.games.calls(), 0);
    assert_eq!(sources.books.calls(), 1);

    // The failure is not cached
    let _ = service
        .search("dune", CategoryFilter::Only(Category::Books))
        .await;
    assert_eq!(sources.books.calls(), 2);
}

#[tokio::test]
async fn test_repeat_search_is_served_from_cache() {
    let sources = Sources {
        games: ScriptedSource::returning(
            Category::Games,
            vec![item(IdPrefix::Game, "4200", "Portal 2", "Valve", 2011)],
        ),
        movies: ScriptedSource::empty(Category::Movies),
        music: ScriptedSource::empty(Category::Music),
        books: ScriptedSource::empty(Category::Books),
    };
    let service = sources.service(MedleyConfig::for_testing());

    let first = assert_ok!(service.search("Portal", CategoryFilter::All).await);
    let second = assert_ok!(service.search("portal", CategoryFilter::All).await);

    assert_eq!(sources.total_calls(), 4);
    assert!(second.from_cache);
    assert_eq!(first.results, second.results);

    let stats = service.cache_statistics();
    assert_eq!(stats.hit_count, 1);
    assert_eq!(stats.miss_count, 1);
}

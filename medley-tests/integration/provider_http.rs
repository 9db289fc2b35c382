//! Provider clients against a local stub server.

use std::sync::Arc;

use medley_core::{MedleyConfig, ProviderConfig};
use medley_search::providers::{GoogleBooksClient, ItunesClient, RawgClient};
use medley_search::{
    AdapterErrorKind, AdapterLimits, BooksAdapter, Category, CategoryFilter, GamesAdapter,
    LookupCache, MediaSearchService, MusicAdapter, Ranker, SourceAdapter,
};

use crate::support::{init_test_tracing, stub_server, titles};

const VOLUMES_BODY: &str = r#"{
    "kind": "books#volumes",
    "items": [
        {"id": "B1hSG45JCX4C", "volumeInfo": {"title": "Dune", "authors": ["Frank Herbert"],
         "publishedDate": "1965-08-01", "averageRating": 4.5}}
    ]
}"#;

const TMDB_BODY: &str = r#"{
    "page": 1,
    "results": [
        {"id": 438631, "media_type": "movie", "title": "Dune", "release_date": "2021-09-15",
         "vote_average": 7.8, "vote_count": 12000}
    ]
}"#;

const ITUNES_BODY: &str = r#"{
    "resultCount": 1,
    "results": [
        {"wrapperType": "collection", "collectionId": 1440831203, "collectionName": "Dune (Original Motion Picture Soundtrack)",
         "artistName": "Hans Zimmer", "releaseDate": "2021-09-17T07:00:00Z"}
    ]
}"#;

#[tokio::test]
async fn test_rawg_429_is_rate_limit() -> anyhow::Result<()> {
    init_test_tracing();
    let base = stub_server("429 Too Many Requests", "{}").await?;
    let config = ProviderConfig {
        rawg_base_url: base,
        ..Default::default()
    };
    let adapter = GamesAdapter::new(
        RawgClient::new(&config)?,
        Arc::new(LookupCache::new()),
        AdapterLimits::default(),
    );

    let error = adapter.search("mario").await.unwrap_err();
    assert_eq!(error.category, Category::Games);
    assert!(error.is_rate_limited());
    Ok(())
}

#[tokio::test]
async fn test_quota_message_is_rate_limit() -> anyhow::Result<()> {
    let base = stub_server(
        "403 Forbidden",
        r#"{"error": {"code": 403, "message": "Quota exceeded for quota metric 'Queries'"}}"#,
    )
    .await?;
    let config = ProviderConfig {
        google_books_base_url: base,
        ..Default::default()
    };
    let adapter = BooksAdapter::new(GoogleBooksClient::new(&config)?, AdapterLimits::default());

    let error = adapter.search("dune").await.unwrap_err();
    assert!(error.is_rate_limited());
    Ok(())
}

#[tokio::test]
async fn test_google_books_volume_becomes_result() -> anyhow::Result<()> {
    let base = stub_server("200 OK", VOLUMES_BODY).await?;
    let config = ProviderConfig {
        google_books_base_url: base,
        ..Default::default()
    };
    let adapter = BooksAdapter::new(GoogleBooksClient::new(&config)?, AdapterLimits::default());

    let results = adapter.search("dune").await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id(), "book-B1hSG45JCX4C");
    assert_eq!(results[0].creator(), "Frank Herbert");
    assert_eq!(results[0].year(), 1965);
    Ok(())
}

#[tokio::test]
async fn test_unexpected_json_is_malformed() -> anyhow::Result<()> {
    let base = stub_server("200 OK", r#"{"results": "not a list"}"#).await?;
    let config = ProviderConfig {
        itunes_base_url: base,
        ..Default::default()
    };
    let adapter = MusicAdapter::new(ItunesClient::new(&config)?, AdapterLimits::default());

    let error = adapter.search("dune").await.unwrap_err();
    assert!(matches!(error.kind, AdapterErrorKind::Malformed { .. }));
    Ok(())
}

#[tokio::test]
async fn test_service_over_http_providers() -> anyhow::Result<()> {
    init_test_tracing();
    let mut config = MedleyConfig::for_testing();
    config.providers.rawg_base_url = stub_server("429 Too Many Requests", "{}").await?;
    config.providers.tmdb_base_url = stub_server("200 OK", TMDB_BODY).await?;
    config.providers.itunes_base_url = stub_server("200 OK", ITUNES_BODY).await?;
    config.providers.google_books_base_url = stub_server("200 OK", VOLUMES_BODY).await?;

    let service = MediaSearchService::from_config(config)?.with_ranker(Ranker::new(2025));
    let outcome = service.search("dune", CategoryFilter::All).await?;

    // Exact titles first, newer before older
    assert_eq!(
        titles(&outcome.results),
        [
            "Dune",
            "Dune",
            "Dune (Original Motion Picture Soundtrack)"
        ]
    );
    assert_eq!(outcome.results[0].id(), "movie-438631");
    // The credits stub carries no crew, so the placeholder stays
    assert_eq!(outcome.results[0].creator(), "Unknown Director");
    assert_eq!(outcome.results[1].id(), "book-B1hSG45JCX4C");

    // Games were rate limited and the sample catalog has no "dune"
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].is_rate_limited());
    Ok(())
}

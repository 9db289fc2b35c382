//! "Already in library" annotation against the in-memory library.

use chrono::Utc;
use medley_core::{InMemoryLibrary, LibraryItem, LibraryStatus, LibraryStore, MedleyConfig};
use medley_search::{Category, CategoryFilter, IdPrefix, MediaSearchService, same_item};

use crate::support::{ScriptedSource, Sources, item};

fn library_item(id: &str, title: &str, category: Category, status: LibraryStatus) -> LibraryItem {
    LibraryItem {
        id: id.to_string(),
        title: title.to_string(),
        category,
        status,
        added_at: Utc::now(),
    }
}

fn sources() -> Sources {
    Sources {
        games: ScriptedSource::returning(
            Category::Games,
            vec![item(IdPrefix::Game, "123", "Halo: Combat Evolved", "Bungie", 2001)],
        ),
        movies: ScriptedSource::returning(
            Category::Movies,
            vec![item(IdPrefix::Movie, "123", "Halo Legends", "Shinji Aramaki", 2010)],
        ),
        music: ScriptedSource::returning(
            Category::Music,
            vec![item(IdPrefix::Album, "77", "Halo Original Soundtrack", "Martin O'Donnell", 2001)],
        ),
        books: ScriptedSource::empty(Category::Books),
    }
}

#[test]
fn test_bare_and_prefixed_ids_match() {
    assert!(same_item("123", "game-123"));
    assert!(same_item("42", "tv-42"));
    assert!(!same_item("movie-42", "tv-42"));
    assert!(!same_item("123", "game-1234"));
}

#[tokio::test]
async fn test_annotation_marks_tracked_results() -> anyhow::Result<()> {
    let library = InMemoryLibrary::with_items(vec![
        library_item("123", "Halo", Category::Games, LibraryStatus::Completed),
        library_item("album-77", "Halo OST", Category::Music, LibraryStatus::Planned),
    ]);
    let service = sources().service(MedleyConfig::for_testing());

    let outcome = service.search("halo", CategoryFilter::All).await?;
    let items = library.library_items().await?;
    let annotated = MediaSearchService::annotate(&outcome.results, &items);

    let status_of = |id: &str| {
        annotated
            .iter()
            .find(|entry| entry.result.id() == id)
            .and_then(|entry| entry.tracked)
    };
    assert_eq!(status_of("game-123"), Some(LibraryStatus::Completed));
    assert_eq!(status_of("album-77"), Some(LibraryStatus::Planned));
    // Same native id, different category
    assert_eq!(status_of("movie-123"), None);
    Ok(())
}

#[tokio::test]
async fn test_tracking_from_results_updates_annotation() -> anyhow::Result<()> {
    let library = InMemoryLibrary::new();
    let sources = sources();
    let service = sources.service(MedleyConfig::for_testing());

    let outcome = service
        .search("halo", CategoryFilter::Only(Category::Movies))
        .await?;
    let legends = &outcome.results[0];
    assert!(!MediaSearchService::is_in_library(legends, &library.library_items().await?));

    service
        .track(&library, legends, LibraryStatus::InProgress)
        .await?;

    let items = library.library_items().await?;
    assert!(MediaSearchService::is_in_library(legends, &items));
    assert_eq!(items[0].id, "movie-123");

    // Cached results are reused after a library change
    let again = service
        .search("halo", CategoryFilter::Only(Category::Movies))
        .await?;
    assert!(again.from_cache);
    assert_eq!(sources.movies.calls(), 1);
    Ok(())
}

//! Games adapter over RAWG.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::{AdapterLimits, SourceAdapter, lookup_creators, require_query};
use crate::cache::LookupCache;
use crate::errors::AdapterError;
use crate::normalizer::{current_year, parse_year, resolve_creator};
use crate::providers::{GameCatalog, RawgGame};
use crate::types::{Category, IdPrefix, SearchResult};

/// Searches games and enriches the top candidates with their developer.
#[derive(Debug)]
pub struct GamesAdapter<C> {
    catalog: C,
    lookups: Arc<LookupCache>,
    limits: AdapterLimits,
}

impl<C: GameCatalog> GamesAdapter<C> {
    /// Wraps a game catalog; detail lookups go through `lookups`.
    pub fn new(catalog: C, lookups: Arc<LookupCache>, limits: AdapterLimits) -> Self {
        Self {
            catalog,
            lookups,
            limits,
        }
    }

    fn to_result(
        game: &RawgGame,
        developer: Option<&str>,
        fallback_year: i32,
    ) -> Option<SearchResult> {
        let creator = resolve_creator(
            Category::Games,
            [
                developer,
                game.developers.first().map(|d| d.name.as_str()),
                game.publishers.first().map(|p| p.name.as_str()),
            ],
        );
        let year = game
            .released
            .as_deref()
            .and_then(parse_year)
            .unwrap_or(fallback_year);

        match SearchResult::new(IdPrefix::Game, &game.id.to_string(), &game.name, creator, year) {
            Ok(result) => Some(
                result
                    // RAWG reports 0 for unrated games
                    .with_rating(game.rating.filter(|rating| *rating > 0.0))
                    .with_genre(game.genres.first().map(|g| g.name.clone()))
                    .with_image(game.background_image.clone())
                    .with_popularity(game.added.map(|added| added as f32)),
            ),
            Err(e) => {
                tracing::debug!("Skipping RAWG game {}: {}", game.id, e);
                None
            }
        }
    }
}

#[async_trait]
impl<C: GameCatalog> SourceAdapter for GamesAdapter<C> {
    fn category(&self) -> Category {
        Category::Games
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AdapterError> {
        let query = require_query(Category::Games, query)?;
        let started = Instant::now();

        let mut games = self
            .catalog
            .search_games(query, self.limits.max_results)
            .await
            .map_err(|e| AdapterError::from_provider(Category::Games, e))?;
        games.truncate(self.limits.max_results);

        let targets = games
            .iter()
            .map(|game| (self.catalog.game_detail_url(game.id), game.id))
            .collect();
        let developers = lookup_creators(
            &self.lookups,
            Category::Games,
            targets,
            self.limits.enrich_top,
            |id| self.catalog.fetch_game_developer(id),
        )
        .await;

        let fallback_year = current_year();
        let results: Vec<SearchResult> = games
            .iter()
            .zip(developers)
            .filter_map(|(game, developer)| {
                Self::to_result(game, developer.as_deref(), fallback_year)
            })
            .collect();

        tracing::debug!(
            "Games search for '{}' produced {} results in {:?}",
            query,
            results.len(),
            started.elapsed()
        );
        Ok(results)
    }
}

//! Offline sample data used when a provider is rate limited.
//!
//! RAWG's free tier runs out of quota quickly, so games ship with a small
//! built-in catalog. Other categories can be given a dataset explicitly.

use std::collections::HashMap;
use std::sync::Arc;

use medley_core::FallbackConfig;

use crate::errors::AdapterError;
use crate::types::{Category, IdPrefix, SearchResult};

/// Built-in games: (native id, title, developer, year, rating, genre).
const SAMPLE_GAMES: &[(&str, &str, &str, i32, f32, &str)] = &[
    ("sample-1", "Super Mario Odyssey", "Nintendo EPD", 2017, 4.4, "Platformer"),
    ("sample-2", "Mario Kart 8 Deluxe", "Nintendo EPD", 2017, 4.5, "Racing"),
    ("sample-3", "Super Mario Bros. Wonder", "Nintendo EPD", 2023, 4.5, "Platformer"),
    ("sample-4", "The Legend of Zelda: Breath of the Wild", "Nintendo EPD", 2017, 4.6, "Adventure"),
    (
        "sample-5",
        "The Legend of Zelda: Tears of the Kingdom",
        "Nintendo EPD",
        2023,
        4.6,
        "Adventure",
    ),
    ("sample-6", "Elden Ring", "FromSoftware", 2022, 4.4, "Action RPG"),
    ("sample-7", "Hollow Knight", "Team Cherry", 2017, 4.4, "Metroidvania"),
    ("sample-8", "Hades", "Supergiant Games", 2020, 4.5, "Roguelike"),
    ("sample-9", "Celeste", "Maddy Makes Games", 2018, 4.3, "Platformer"),
    ("sample-10", "Stardew Valley", "ConcernedApe", 2016, 4.4, "Simulation"),
    ("sample-11", "Red Dead Redemption 2", "Rockstar Games", 2018, 4.6, "Action"),
    ("sample-12", "The Witcher 3: Wild Hunt", "CD Projekt Red", 2015, 4.7, "RPG"),
    ("sample-13", "Minecraft", "Mojang Studios", 2011, 4.4, "Sandbox"),
    ("sample-14", "Portal 2", "Valve", 2011, 4.6, "Puzzle"),
];

/// Decides when a failed source is replaced by sample data, and supplies it.
#[derive(Debug, Clone, Default)]
pub struct FallbackPolicy {
    datasets: HashMap<Category, Arc<[SearchResult]>>,
}

impl FallbackPolicy {
    /// Policy with the built-in datasets of every enabled category.
    pub fn from_config(config: &FallbackConfig) -> Self {
        let mut policy = Self::disabled();
        if config.is_enabled(Category::Games) {
            policy = policy.with_dataset(Category::Games, sample_games());
        }
        for category in [Category::Movies, Category::Music, Category::Books] {
            if config.is_enabled(category) {
                tracing::warn!("No built-in fallback data for {}, ignoring", category);
            }
        }
        policy
    }

    /// Policy that never substitutes data.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Sets the dataset for a category; items of other categories are dropped.
    pub fn with_dataset(mut self, category: Category, items: Vec<SearchResult>) -> Self {
        let items: Arc<[SearchResult]> = items
            .into_iter()
            .filter(|item| item.category() == category)
            .collect();
        self.datasets.insert(category, items);
        self
    }

    /// Whether a dataset is configured for a category.
    pub fn has_dataset(&self, category: Category) -> bool {
        self.datasets.contains_key(&category)
    }

    /// Whether a failure should be answered with sample data.
    ///
    /// Only rate limiting triggers fallback; other failures are reported as-is.
    pub fn applies_to(&self, error: &AdapterError) -> bool {
        error.is_rate_limited() && self.has_dataset(error.category)
    }

    /// Sample items whose title contains the query, case-insensitively.
    pub fn fallback_for(&self, category: Category, query: &str, limit: usize) -> Vec<SearchResult> {
        let Some(items) = self.datasets.get(&category) else {
            return Vec::new();
        };
        let query = query.trim().to_lowercase();

        items
            .iter()
            .filter(|item| item.title().to_lowercase().contains(&query))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// The built-in games catalog.
pub fn sample_games() -> Vec<SearchResult> {
    SAMPLE_GAMES
        .iter()
        .filter_map(|&(id, title, developer, year, rating, genre)| {
            SearchResult::new(IdPrefix::Game, id, title, developer.to_string(), year)
                .ok()
                .map(|result| {
                    result
                        .with_rating(Some(rating))
                        .with_genre(Some(genre.to_string()))
                })
        })
        .collect()
}

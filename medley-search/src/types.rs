//! Unified result model shared by every search source.

use std::fmt;
use std::str::FromStr;

pub use medley_core::Category;
use medley_core::ParseCategoryError;
use serde::{Deserialize, Serialize};

/// Which categories a search fans out to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// Every category
    #[default]
    All,
    /// A single category
    Only(Category),
}

impl CategoryFilter {
    /// Selected categories in the fixed fan-out order.
    pub fn categories(self) -> Vec<Category> {
        match self {
            CategoryFilter::All => Category::ALL.to_vec(),
            CategoryFilter::Only(category) => vec![category],
        }
    }

    /// Whether a category is part of this filter.
    pub fn includes(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => selected == category,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        CategoryFilter::Only(category)
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => f.write_str(category.as_str()),
        }
    }
}

/// Category prefix carried by every result id.
///
/// Movies and series share the movies category; albums and tracks share
/// music. The prefix alone is enough to recover the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    /// `game-`
    Game,
    /// `movie-`
    Movie,
    /// `tv-`
    Tv,
    /// `album-`
    Album,
    /// `track-`
    Track,
    /// `book-`
    Book,
}

impl IdPrefix {
    /// Every known prefix.
    pub const ALL: [IdPrefix; 6] = [
        IdPrefix::Game,
        IdPrefix::Movie,
        IdPrefix::Tv,
        IdPrefix::Album,
        IdPrefix::Track,
        IdPrefix::Book,
    ];

    /// Prefix text including the trailing dash.
    pub fn as_str(self) -> &'static str {
        match self {
            IdPrefix::Game => "game-",
            IdPrefix::Movie => "movie-",
            IdPrefix::Tv => "tv-",
            IdPrefix::Album => "album-",
            IdPrefix::Track => "track-",
            IdPrefix::Book => "book-",
        }
    }

    /// Category this prefix belongs to.
    pub fn category(self) -> Category {
        match self {
            IdPrefix::Game => Category::Games,
            IdPrefix::Movie | IdPrefix::Tv => Category::Movies,
            IdPrefix::Album | IdPrefix::Track => Category::Music,
            IdPrefix::Book => Category::Books,
        }
    }

    /// Finds the prefix an id starts with.
    pub fn of(id: &str) -> Option<IdPrefix> {
        IdPrefix::ALL
            .into_iter()
            .find(|prefix| id.starts_with(prefix.as_str()))
    }
}

/// Provider-agnostic search result.
///
/// Built by a source adapter from a provider record and never modified
/// afterwards; the fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    id: String,
    category: Category,
    title: String,
    creator: String,
    year: i32,
    rating: Option<f32>,
    genre: Option<String>,
    image: Option<String>,
    popularity: Option<f32>,
    is_series: bool,
}

/// Reason a provider record could not become a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidResult {
    /// Title is blank.
    #[error("result title is empty")]
    EmptyTitle,

    /// Native id is blank.
    #[error("provider id is empty")]
    EmptyId,
}

impl SearchResult {
    /// Creates a result with its required fields.
    ///
    /// The category is derived from `prefix`, and `creator` is expected to be
    /// already resolved by the normalizer.
    ///
    /// # Errors
    /// - `InvalidResult::EmptyTitle` - Title is blank
    /// - `InvalidResult::EmptyId` - Native id is blank
    pub fn new(
        prefix: IdPrefix,
        native_id: &str,
        title: &str,
        creator: String,
        year: i32,
    ) -> Result<Self, InvalidResult> {
        let native_id = native_id.trim();
        let title = title.trim();

        if native_id.is_empty() {
            return Err(InvalidResult::EmptyId);
        }
        if title.is_empty() {
            return Err(InvalidResult::EmptyTitle);
        }

        Ok(Self {
            id: format!("{}{native_id}", prefix.as_str()),
            category: prefix.category(),
            title: title.to_string(),
            creator,
            year,
            rating: None,
            genre: None,
            image: None,
            popularity: None,
            is_series: prefix == IdPrefix::Tv,
        })
    }

    /// Sets the 0-5 rating, dropping values outside the scale.
    pub fn with_rating(mut self, rating: Option<f32>) -> Self {
        self.rating = rating.filter(|r| r.is_finite() && (0.0..=5.0).contains(r));
        self
    }

    /// Sets the genre, ignoring blank values.
    pub fn with_genre(mut self, genre: Option<String>) -> Self {
        self.genre = genre.filter(|g| !g.trim().is_empty());
        self
    }

    /// Sets the artwork URL, ignoring blank values.
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image.filter(|i| !i.trim().is_empty());
        self
    }

    /// Sets the provider popularity score.
    pub fn with_popularity(mut self, popularity: Option<f32>) -> Self {
        self.popularity = popularity;
        self
    }

    /// Prefixed id, e.g. `game-3498`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Category derived from the id prefix.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Resolved creator, never blank.
    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// Release year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Rating on a 0-5 scale, if the provider has one.
    pub fn rating(&self) -> Option<f32> {
        self.rating
    }

    /// Primary genre.
    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    /// Cover or poster URL.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Provider popularity score.
    pub fn popularity(&self) -> Option<f32> {
        self.popularity
    }

    /// Whether this is a TV series rather than a movie.
    pub fn is_series(&self) -> bool {
        self.is_series
    }

    /// Provider-native id without the category prefix.
    pub fn native_id(&self) -> &str {
        crate::normalizer::strip_category_prefix(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "Music".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(Category::Music))
        );
        assert!("comics".parse::<CategoryFilter>().is_err());
        assert_eq!(CategoryFilter::Only(Category::Books).to_string(), "books");
    }

    #[test]
    fn test_filter_categories_keep_fan_out_order() {
        assert_eq!(
            CategoryFilter::All.categories(),
            vec![
                Category::Games,
                Category::Movies,
                Category::Music,
                Category::Books
            ]
        );
        assert!(!CategoryFilter::Only(Category::Games).includes(Category::Books));
    }

    #[test]
    fn test_prefix_determines_category() {
        let series = SearchResult::new(
            IdPrefix::Tv,
            "1396",
            "Breaking Bad",
            "Vince Gilligan".to_string(),
            2008,
        )
        .unwrap();

        assert_eq!(series.id(), "tv-1396");
        assert_eq!(series.category(), Category::Movies);
        assert!(series.is_series());
        assert_eq!(series.native_id(), "1396");
        assert_eq!(IdPrefix::of("track-42"), Some(IdPrefix::Track));
        assert_eq!(IdPrefix::of("42"), None);
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let result = SearchResult::new(
            IdPrefix::Book,
            "zyTCAlFPjgYC",
            "   ",
            "Unknown Author".to_string(),
            2001,
        );
        assert_eq!(result, Err(InvalidResult::EmptyTitle));
    }

    #[test]
    fn test_out_of_scale_rating_is_dropped() {
        let result = SearchResult::new(IdPrefix::Game, "1", "Doom", "id Software".to_string(), 1993)
            .unwrap()
            .with_rating(Some(8.7));
        assert_eq!(result.rating(), None);
    }
}

//! Media categories and tracked library items.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four kinds of media Medley tracks.
///
/// Every search source, cache key and library entry is scoped to exactly one
/// category, so dispatch is an exhaustive match rather than string compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Games,
    Movies,
    Music,
    Books,
}

impl Category {
    /// All categories in the fixed fan-out order.
    pub const ALL: [Category; 4] = [
        Category::Games,
        Category::Movies,
        Category::Music,
        Category::Books,
    ];

    /// Lowercase name used in filters and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Games => "games",
            Category::Movies => "movies",
            Category::Music => "music",
            Category::Books => "books",
        }
    }

    /// Creator shown when no provider field yields a usable name.
    pub fn creator_placeholder(self) -> &'static str {
        match self {
            Category::Games => "Unknown Developer",
            Category::Movies => "Unknown Director",
            Category::Music => "Unknown Artist",
            Category::Books => "Unknown Author",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown media category: {value}")]
pub struct ParseCategoryError {
    pub value: String,
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "games" | "game" => Ok(Category::Games),
            "movies" | "movie" | "tv" => Ok(Category::Movies),
            "music" => Ok(Category::Music),
            "books" | "book" => Ok(Category::Books),
            _ => Err(ParseCategoryError {
                value: s.to_string(),
            }),
        }
    }
}

/// Tracking status of an item the user has added to their library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryStatus {
    Planned,
    InProgress,
    Completed,
    OnHold,
    Dropped,
}

impl LibraryStatus {
    /// Human readable label for status badges.
    pub fn label(self) -> &'static str {
        match self {
            LibraryStatus::Planned => "Planned",
            LibraryStatus::InProgress => "In Progress",
            LibraryStatus::Completed => "Completed",
            LibraryStatus::OnHold => "On Hold",
            LibraryStatus::Dropped => "Dropped",
        }
    }
}

/// An entry owned by the library collaborator.
///
/// The id may be stored bare (`"123"`) or with any known category prefix;
/// matching against search results goes through the search crate's
/// normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub status: LibraryStatus,
    pub added_at: DateTime<Utc>,
}

//! Library collaborator interface.
//!
//! Persistence of tracked items lives outside the search engine. Search only
//! reads the library to annotate results; adding goes through the same trait
//! so the presentation layer has one seam to call.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::media::{Category, LibraryItem, LibraryStatus};

/// Errors reported by a library backend.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Item {id} ({title}) is already tracked")]
    AlreadyTracked { id: String, title: String },

    #[error("Library backend unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Item about to be added to the library.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLibraryItem {
    pub id: String,
    pub title: String,
    pub category: Category,
}

/// Read/add access to the user's tracked items.
#[async_trait]
pub trait LibraryStore: Send + Sync + std::fmt::Debug {
    /// Returns every tracked item.
    ///
    /// # Errors
    /// - `LibraryError::Unavailable` - Backend could not be reached
    async fn library_items(&self) -> Result<Vec<LibraryItem>, LibraryError>;

    /// Tracks a new item with the given status.
    ///
    /// # Errors
    /// - `LibraryError::AlreadyTracked` - An item with the same id exists
    /// - `LibraryError::Unavailable` - Backend could not be reached
    async fn add_item(
        &self,
        item: NewLibraryItem,
        status: LibraryStatus,
    ) -> Result<LibraryItem, LibraryError>;
}

/// Process-local library used for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryLibrary {
    items: RwLock<Vec<LibraryItem>>,
}

impl InMemoryLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a library pre-populated with items.
    pub fn with_items(items: Vec<LibraryItem>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Number of tracked items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether nothing is tracked yet.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl LibraryStore for InMemoryLibrary {
    async fn library_items(&self) -> Result<Vec<LibraryItem>, LibraryError> {
        Ok(self.items.read().clone())
    }

    async fn add_item(
        &self,
        item: NewLibraryItem,
        status: LibraryStatus,
    ) -> Result<LibraryItem, LibraryError> {
        let mut items = self.items.write();

        if items.iter().any(|existing| existing.id == item.id) {
            return Err(LibraryError::AlreadyTracked {
                id: item.id,
                title: item.title,
            });
        }

        let tracked = LibraryItem {
            id: item.id,
            title: item.title,
            category: item.category,
            status,
            added_at: Utc::now(),
        };
        items.push(tracked.clone());

        tracing::debug!(
            "Tracked {} '{}' as {}",
            tracked.category,
            tracked.title,
            status.label()
        );

        Ok(tracked)
    }
}

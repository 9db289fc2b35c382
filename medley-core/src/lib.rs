//! Medley Core - Shared building blocks for the media tracker
//!
//! This crate provides the pieces every Medley subsystem leans on: the media
//! category model, the library collaborator interface, centralized
//! configuration and tracing setup.

pub mod config;
pub mod library;
pub mod media;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{FallbackConfig, MedleyConfig, ProviderConfig, SearchConfig};
pub use library::{InMemoryLibrary, LibraryError, LibraryStore, NewLibraryItem};
pub use media::{Category, LibraryItem, LibraryStatus, ParseCategoryError};

/// Core errors that can bubble up from any Medley subsystem.
///
/// Search-level failures are wrapped by the search crate's own error type;
/// this enum covers what the core itself can report.
#[derive(Debug, thiserror::Error)]
pub enum MedleyError {
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MedleyError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            MedleyError::Library(e) => match e {
                LibraryError::AlreadyTracked { title, .. } => {
                    format!("{title} is already in your library")
                }
                LibraryError::Unavailable { .. } => "Library is unavailable right now".to_string(),
            },
            MedleyError::Configuration { .. } => "Configuration error occurred".to_string(),
            MedleyError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MedleyError::Configuration { .. }
                | MedleyError::Library(LibraryError::AlreadyTracked { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, MedleyError>;

//! Error types for media search.

use thiserror::Error;

use crate::types::Category;

/// Failures reported by a provider HTTP client.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// Provider declared a rate limit or exhausted quota.
    #[error("Provider rate limit reached")]
    RateLimited,

    /// Provider answered with a non-success status.
    #[error("Provider returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Response body did not match the expected schema.
    #[error("Parse error: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ProviderError::Parse {
                reason: error.to_string(),
            }
        } else if let Some(status) = error.status() {
            ProviderError::Status {
                status: status.as_u16(),
            }
        } else {
            ProviderError::Network {
                reason: error.to_string(),
            }
        }
    }
}

/// Why one source adapter failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterErrorKind {
    /// Provider could not be reached.
    #[error("network failure: {reason}")]
    Network {
        /// Transport error description
        reason: String,
    },

    /// Quota exhausted or HTTP 429.
    #[error("provider rate limit reached")]
    RateLimited,

    /// Response body did not decode.
    #[error("malformed provider response: {reason}")]
    Malformed {
        /// Decoder error description
        reason: String,
    },

    /// Provider answered with a non-success status.
    #[error("provider returned HTTP {status}")]
    Provider {
        /// HTTP status code
        status: u16,
    },

    /// Source did not settle within its time budget.
    #[error("no response within {millis} ms")]
    Timeout {
        /// Budget that ran out
        millis: u64,
    },

    /// Source task panicked or was cancelled.
    #[error("source task aborted: {reason}")]
    Crashed {
        /// Join error description
        reason: String,
    },

    /// Query was empty after trimming.
    #[error("query must not be empty")]
    InvalidQuery,
}

impl From<ProviderError> for AdapterErrorKind {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Network { reason } => AdapterErrorKind::Network { reason },
            ProviderError::RateLimited => AdapterErrorKind::RateLimited,
            ProviderError::Status { status } => AdapterErrorKind::Provider { status },
            ProviderError::Parse { reason } => AdapterErrorKind::Malformed { reason },
        }
    }
}

/// Failure of one category's source, the only error that crosses the
/// aggregator boundary.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{category} source failed: {kind}")]
pub struct AdapterError {
    /// Category whose source failed
    pub category: Category,
    /// What went wrong
    pub kind: AdapterErrorKind,
}

impl AdapterError {
    /// Creates an error for a category.
    pub fn new(category: Category, kind: AdapterErrorKind) -> Self {
        Self { category, kind }
    }

    /// Wraps a provider client failure for the given category.
    pub fn from_provider(category: Category, error: ProviderError) -> Self {
        Self::new(category, error.into())
    }

    /// Whether the provider refused because of its rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.kind, AdapterErrorKind::RateLimited)
    }

    /// Short machine-readable reason for diagnostics.
    pub fn reason(&self) -> &'static str {
        match self.kind {
            AdapterErrorKind::Network { .. } => "network",
            AdapterErrorKind::RateLimited => "rate-limit",
            AdapterErrorKind::Malformed { .. } => "malformed",
            AdapterErrorKind::Provider { .. } => "provider",
            AdapterErrorKind::Timeout { .. } => "timeout",
            AdapterErrorKind::Crashed { .. } => "crashed",
            AdapterErrorKind::InvalidQuery => "invalid-query",
        }
    }
}

/// Errors surfaced by an aggregated search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Query was empty after trimming.
    #[error("Search query must not be empty")]
    EmptyQuery,

    /// Every selected source failed and no fallback data was available.
    #[error("All search sources failed for '{query}': {}", describe_failures(failures))]
    AllSourcesFailed {
        /// The query that was searched
        query: String,
        /// One failure per selected source
        failures: Vec<AdapterError>,
    },
}

impl SearchError {
    /// Whether re-running the same search may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::AllSourcesFailed { .. })
    }
}

fn describe_failures(failures: &[AdapterError]) -> String {
    failures
        .iter()
        .map(|failure| format!("{} ({})", failure.category, failure.kind))
        .collect::<Vec<_>>()
        .join(", ")
}

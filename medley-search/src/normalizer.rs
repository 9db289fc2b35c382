//! Cross-schema field reconciliation.
//!
//! Providers disagree on where the "creator" of an item lives and on how ids
//! are written. Adapters pass their category-specific candidates here so the
//! rules stay in one place, and the presentation layer uses the id helpers to
//! tell whether a result is already tracked.

use chrono::Datelike;
use medley_core::LibraryItem;

use crate::types::{Category, IdPrefix, SearchResult};

/// Values providers use when they do not actually know the creator.
const PLACEHOLDER_CREATORS: &[&str] = &[
    "unknown developer",
    "game studio",
    "unknown director",
    "unknown artist",
    "unknown author",
    "unknown",
    "n/a",
];

/// Whether a creator name is a stand-in rather than a real name.
pub fn is_placeholder_creator(name: &str) -> bool {
    let name = name.trim();
    name.is_empty()
        || PLACEHOLDER_CREATORS
            .iter()
            .any(|placeholder| name.eq_ignore_ascii_case(placeholder))
}

/// Picks the first usable creator from candidates in priority order.
///
/// Candidates that are missing, blank or placeholders fall through to the
/// next one; when none is usable the category placeholder is returned.
pub fn resolve_creator<'a>(
    category: Category,
    candidates: impl IntoIterator<Item = Option<&'a str>>,
) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !is_placeholder_creator(name))
        .map(str::to_string)
        .unwrap_or_else(|| category.creator_placeholder().to_string())
}

/// Leading year of a provider date (`2017`, `2017-10-27`, `2017-10-27T07:00:00Z`).
pub fn parse_year(date: &str) -> Option<i32> {
    let digits = date.trim().get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Current calendar year (UTC), used for missing release years and ranking.
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Removes one known category prefix from an id.
pub fn strip_category_prefix(id: &str) -> &str {
    let id = id.trim();
    match IdPrefix::of(id) {
        Some(prefix) => &id[prefix.as_str().len()..],
        None => id,
    }
}

/// Whether two ids refer to the same provider item once prefixes are removed.
///
/// A bare id matches any prefix. When both ids carry a prefix the kinds must
/// agree: TMDB numbers movies and series independently, as iTunes does for
/// albums and tracks.
pub fn same_item(a: &str, b: &str) -> bool {
    if let (Some(left), Some(right)) = (IdPrefix::of(a.trim()), IdPrefix::of(b.trim())) {
        if left != right {
            return false;
        }
    }
    let a = strip_category_prefix(a);
    !a.is_empty() && a == strip_category_prefix(b)
}

/// Finds the library entry tracking a search result.
///
/// Ids are compared without category prefixes; the category must match too,
/// since different providers reuse the same numeric ids.
pub fn find_in_library<'a>(
    result: &SearchResult,
    items: &'a [LibraryItem],
) -> Option<&'a LibraryItem> {
    items
        .iter()
        .find(|item| item.category == result.category() && same_item(&item.id, result.id()))
}

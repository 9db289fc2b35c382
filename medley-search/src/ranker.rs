//! Result ordering
//!
//! A fixed comparator chain: name relevance beats recency, and recency beats
//! rating. Each rule only decides when every earlier rule tied, and the sort
//! is stable so remaining ties keep their merge order.

use std::cmp::Ordering;

use crate::normalizer::current_year;
use crate::types::SearchResult;

/// Orders merged results for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranker {
    current_year: i32,
}

impl Ranker {
    /// Creates a ranker that treats `current_year` as the recency boundary.
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Creates a ranker for today's calendar year.
    pub fn for_current_year() -> Self {
        Self::new(current_year())
    }

    /// Year treated as current for recency.
    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Orders results for the given query.
    pub fn rank(&self, query: &str, results: Vec<SearchResult>) -> Vec<SearchResult> {
        let query = query.trim().to_lowercase();
        // Lowercase each field once instead of per comparison
        let mut keyed: Vec<(RankKey, SearchResult)> = results
            .into_iter()
            .map(|result| (RankKey::new(&result, &query), result))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| self.compare_keys(a, b));
        keyed.into_iter().map(|(_, result)| result).collect()
    }

    /// Compares two results for the given query.
    pub fn compare(&self, query: &str, a: &SearchResult, b: &SearchResult) -> Ordering {
        let query = query.trim().to_lowercase();
        self.compare_keys(&RankKey::new(a, &query), &RankKey::new(b, &query))
    }

    fn compare_keys(&self, a: &RankKey, b: &RankKey) -> Ordering {
        b.exact_title
            .cmp(&a.exact_title)
            .then_with(|| b.title_contains.cmp(&a.title_contains))
            .then_with(|| {
                if a.title_contains && b.title_contains {
                    self.compare_recency(a.year, b.year)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| b.creator_contains.cmp(&a.creator_contains))
            .then_with(|| b.rating.total_cmp(&a.rating))
    }

    fn compare_recency(&self, a: i32, b: i32) -> Ordering {
        let a_current = a >= self.current_year;
        let b_current = b >= self.current_year;
        b_current.cmp(&a_current).then_with(|| b.cmp(&a))
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::for_current_year()
    }
}

#[derive(Debug)]
struct RankKey {
    exact_title: bool,
    title_contains: bool,
    creator_contains: bool,
    year: i32,
    rating: f32,
}

impl RankKey {
    fn new(result: &SearchResult, query: &str) -> Self {
        let title = result.title().to_lowercase();
        Self {
            exact_title: title == query,
            title_contains: title.contains(query),
            creator_contains: result.creator().to_lowercase().contains(query),
            year: result.year(),
            rating: result.rating().unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::IdPrefix;

    const YEAR: i32 = 2025;

    fn item(id: &str, title: &str, creator: &str, year: i32, rating: Option<f32>) -> SearchResult {
        SearchResult::new(IdPrefix::Game, id, title, creator.to_string(), year)
            .unwrap()
            .with_rating(rating)
    }

    fn titles(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(SearchResult::title).collect()
    }

    #[test]
    fn test_exact_title_beats_recency_and_rating() {
        let results = vec![
            item("1", "Doom Eternal", "id Software", 2020, Some(4.5)),
            item("2", "Doom", "id Software", 1993, Some(1.0)),
        ];

        let results = Ranker::new(YEAR).rank("doom", results);
        assert_eq!(titles(&results), ["Doom", "Doom Eternal"]);
    }

    #[test]
    fn test_title_substring_beats_creator_match() {
        let results = vec![
            item("1", "Paper Jam", "Mario Club", 2015, Some(5.0)),
            item("2", "Super Mario Odyssey", "Nintendo", 2017, None),
        ];

        let results = Ranker::new(YEAR).rank("mario", results);
        assert_eq!(titles(&results), ["Super Mario Odyssey", "Paper Jam"]);
    }

    #[test]
    fn test_newer_year_first_among_title_matches() {
        let results = vec![
            item("1", "Super Mario Odyssey", "Nintendo", 2017, Some(4.6)),
            item("2", "Mario Kart 8", "Nintendo", 2024, Some(4.0)),
        ];

        let results = Ranker::new(YEAR).rank("Mario", results);
        assert_eq!(titles(&results), ["Mario Kart 8", "Super Mario Odyssey"]);
    }

    #[test]
    fn test_current_year_releases_lead() {
        let results = vec![
            item("1", "Zelda Classic", "Fans", 2024, Some(5.0)),
            item("2", "Zelda Remake", "Nintendo", YEAR, None),
            item("3", "Zelda Next", "Nintendo", YEAR + 1, None),
        ];

        let results = Ranker::new(YEAR).rank("zelda", results);
        assert_eq!(
            titles(&results),
            ["Zelda Next", "Zelda Remake", "Zelda Classic"]
        );
    }

    #[test]
    fn test_recency_ignored_without_title_match() {
        let results = vec![
            item("1", "Odyssey", "Someone", 2024, Some(2.0)),
            item("2", "Galaxy", "Someone", 2007, Some(4.0)),
        ];

        let results = Ranker::new(YEAR).rank("mario", results);
        assert_eq!(titles(&results), ["Galaxy", "Odyssey"]);
    }

    #[test]
    fn test_creator_match_then_rating() {
        let results = vec![
            item("1", "Bloodborne", "Sony", 2015, Some(4.8)),
            item("2", "Elden Ring", "FromSoftware", 2022, Some(4.4)),
            item("3", "Sekiro", "FromSoftware", 2019, Some(4.6)),
        ];

        let results = Ranker::new(YEAR).rank("fromsoftware", results);
        assert_eq!(titles(&results), ["Sekiro", "Elden Ring", "Bloodborne"]);
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let results = vec![
            item("1", "Tetris", "Alexey Pajitnov", 1984, None),
            item("2", "Tetris", "Alexey Pajitnov", 1984, Some(0.0)),
            item("3", "Tetris", "Alexey Pajitnov", 1984, None),
        ];

        let results = Ranker::new(YEAR).rank("tetris", results);
        let ids: Vec<&str> = results.iter().map(SearchResult::id).collect();
        assert_eq!(ids, ["game-1", "game-2", "game-3"]);
    }

    fn arbitrary_result() -> impl Strategy<Value = SearchResult> {
        (
            0u32..1000,
            prop::sample::select(vec!["Halo", "Halo 2", "Halo Infinite", "Destiny", "Myth"]),
            prop::sample::select(vec!["Bungie", "343 Industries", "Halo Studios"]),
            1990i32..2030,
            prop::option::of(0.0f32..5.0),
        )
            .prop_map(|(id, title, creator, year, rating)| {
                item(&id.to_string(), title, creator, year, rating)
            })
    }

    proptest! {
        #[test]
        fn prop_ranking_is_deterministic(
            results in prop::collection::vec(arbitrary_result(), 0..20)
        ) {
            let ranker = Ranker::new(YEAR);
            let first = ranker.rank("halo", results.clone());
            let second = ranker.rank("halo", results);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_exact_titles_precede_everything_else(
            results in prop::collection::vec(arbitrary_result(), 0..20)
        ) {
            let ranked = Ranker::new(YEAR).rank("halo", results);

            let first_other = ranked.iter().position(|r| !r.title().eq_ignore_ascii_case("halo"));
            if let Some(boundary) = first_other {
                prop_assert!(
                    ranked[boundary..]
                        .iter()
                        .all(|r| !r.title().eq_ignore_ascii_case("halo"))
                );
            }
        }
    }
}

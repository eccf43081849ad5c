//! Autocomplete suggestions over the cached tag list.

use super::{Tag, TagCache};
use crate::config::{MAX_SUGGESTIONS, MAX_SUGGESTION_LEN};

/// Suggest tags matching a partial user input.
///
/// An empty query returns the first tags of the cache. Otherwise every tag
/// containing the query (case-insensitive) is returned in cache order. The
/// result holds at most [`MAX_SUGGESTIONS`] entries and never contains a
/// label longer than [`MAX_SUGGESTION_LEN`] characters.
///
/// # Examples
///
/// ```
/// use cataas_bot::tags::{suggest, TagCache};
///
/// let cache = TagCache::from_candidates(["Cute", "grumpy", "cute kitten"]);
/// assert_eq!(suggest(&cache, "CUTE"), ["Cute", "cute kitten"]);
/// ```
#[must_use]
pub fn suggest(cache: &TagCache, query: &str) -> Vec<Tag> {
    let needle = query.to_lowercase();

    cache
        .all()
        .iter()
        .filter(|tag| needle.is_empty() || tag.to_lowercase().contains(&needle))
        // Limit is applied before the label check
        .take(MAX_SUGGESTIONS)
        .filter(|tag| is_valid_label(tag))
        .cloned()
        .collect()
}

fn is_valid_label(tag: &str) -> bool {
    let len = tag.chars().count();
    (1..=MAX_SUGGESTION_LEN).contains(&len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> TagCache {
        TagCache::from_candidates((0..n).map(|i| format!("tag{i}")))
    }

    #[test]
    fn test_empty_query_returns_first_25() {
        let cache = numbered(40);
        let result = suggest(&cache, "");
        assert_eq!(result.len(), 25);
        assert_eq!(result, cache.all()[..25]);
    }

    #[test]
    fn test_case_insensitive_substring() {
        let cache = TagCache::from_candidates(["Orange", "black", "ORANGE cat", "white"]);
        assert_eq!(suggest(&cache, "oRaNgE"), ["Orange", "ORANGE cat"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let cache = TagCache::from_candidates(["cute", "grumpy"]);
        assert!(suggest(&cache, "dog").is_empty());
    }

    #[test]
    fn test_matches_truncated_to_25() {
        let cache = numbered(100);
        let result = suggest(&cache, "tag");
        assert_eq!(result.len(), 25);
        assert_eq!(result.first().map(String::as_str), Some("tag0"));
    }

    #[test]
    fn test_overlong_labels_are_dropped() {
        let long = "x".repeat(101);
        let edge = "x".repeat(100);
        let cache = TagCache::from_candidates([long, edge.clone(), "xy".to_string()]);
        assert_eq!(suggest(&cache, "x"), [edge, "xy".to_string()]);
    }

    #[test]
    fn test_empty_cache() {
        assert!(suggest(&TagCache::default(), "").is_empty());
    }
}

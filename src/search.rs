//! Relevance scoring for people search (no IO).
//!
//! A field matches when it contains the query as a substring (case-insensitive)
//! or when one of its words is trigram-similar to the query. Substring matches
//! always outrank fuzzy ones.

use std::collections::HashSet;

const EXACT: f32 = 1.0;
const WORD_EXACT: f32 = 0.95;
const PREFIX: f32 = 0.85;
const CONTAINS: f32 = 0.7;
/// Fuzzy similarities are scaled below every substring tier.
const FUZZY_WEIGHT: f32 = 0.6;

fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// Trigrams of a single word, padded the way pg_trgm pads (two leading, one trailing space).
fn trigrams(word: &str) -> HashSet<[char; 3]> {
    let padded: Vec<char> = "  "
        .chars()
        .chain(word.chars())
        .chain(std::iter::once(' '))
        .collect();
    padded.windows(3).map(|w| [w[0], w[1], w[2]]).collect()
}

/// Jaccard similarity of the two words' trigram sets, in `0.0..=1.0`.
pub fn similarity(a: &str, b: &str) -> f32 {
    let ta = trigrams(a);
    let tb = trigrams(b);
    let shared = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - shared;
    if union == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let score = shared as f32 / union as f32;
    score
}

fn field_score(query: &str, field: &str, threshold: f32) -> Option<f32> {
    let field = field.to_lowercase();
    if field.is_empty() {
        return None;
    }
    if field == query {
        return Some(EXACT);
    }
    if words(&field).any(|w| w == query) {
        return Some(WORD_EXACT);
    }
    if field.starts_with(query) || words(&field).any(|w| w.starts_with(query)) {
        return Some(PREFIX);
    }
    if field.contains(query) {
        return Some(CONTAINS);
    }

    words(&field)
        .map(|w| similarity(query, w))
        .filter(|s| *s >= threshold)
        .reduce(f32::max)
        .map(|s| s * FUZZY_WEIGHT)
}

/// Best score of `query` against any of `fields`; `None` when nothing matches.
///
/// A blank query matches everything with equal relevance.
pub fn relevance<'a>(
    query: &str,
    fields: impl IntoIterator<Item = &'a str>,
    threshold: f32,
) -> Option<f32> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Some(EXACT);
    }
    fields
        .into_iter()
        .filter_map(|f| field_score(&query, f, threshold))
        .reduce(f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f32 = 0.3;

    #[test]
    fn substring_of_last_name_matches_only_that_person() {
        let jimmy = ["Jimmy Jammy", "jimmyjammy@example.com", "jimmyjammy"];
        let jim = ["Jim McJimmerton", "jimmcjimmerton@example.com", "jimmcjimmerton"];

        assert!(relevance("jam", jimmy, THRESHOLD).is_some());
        assert!(relevance("jam", jim, THRESHOLD).is_none());
        assert!(relevance("example", jimmy, THRESHOLD).is_some());
        assert!(relevance("example", jim, THRESHOLD).is_some());
        assert!(relevance("jimmcji", jim, THRESHOLD).is_some());
    }

    #[test]
    fn exact_word_outranks_prefix() {
        let hank = relevance("hank", ["Hank"], THRESHOLD).unwrap();
        let hanky = relevance("hank", ["Hanky"], THRESHOLD).unwrap();
        assert!(hank > hanky);
    }

    #[test]
    fn fuzzy_match_ranks_below_substring() {
        let fuzzy = relevance("jammie", ["Jimmy Jammy"], THRESHOLD).expect("fuzzy match");
        let substring = relevance("jamm", ["Jimmy Jammy"], THRESHOLD).expect("substring match");
        assert!(fuzzy < substring);
    }

    #[test]
    fn similarity_is_symmetric_and_bounded() {
        let ab = similarity("jam", "jammy");
        assert!((ab - similarity("jammy", "jam")).abs() < f32::EPSILON);
        assert!(ab > 0.0 && ab <= 1.0);
        assert!((similarity("abc", "abc") - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn blank_query_matches_everything() {
        assert!(relevance("  ", ["anything"], THRESHOLD).is_some());
    }
}

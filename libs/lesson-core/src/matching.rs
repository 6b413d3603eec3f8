//! Answer matching for typed exercises.

use serde::{Deserialize, Serialize};

/// Default similarity a typed answer must exceed to count as correct.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Result of comparing a typed answer to the correct answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// Whether the normalized answers are identical.
    pub exact: bool,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
}

/// Compare a typed answer to the correct answer.
///
/// Answers are compared case-insensitively after whitespace normalization.
/// Non-identical answers are accepted when their similarity is strictly
/// greater than `fuzzy_threshold`.
pub fn compare_answers(typed: &str, correct: &str, fuzzy_threshold: f64) -> MatchResult {
    let typed = normalize(typed);
    let correct = normalize(correct);

    if typed == correct {
        return MatchResult {
            is_correct: true,
            exact: true,
            similarity: 1.0,
        };
    }

    let similarity = normalized_similarity(&typed, &correct);
    MatchResult {
        is_correct: similarity > fuzzy_threshold,
        exact: false,
        similarity,
    }
}

/// Lowercase, trim and collapse internal whitespace.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity (0.0 to 1.0) based on Levenshtein distance over
/// the longer string's character count.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("saturday", "sunday"), 3);
    }

    #[test]
    fn test_normalized_similarity() {
        assert_eq!(normalized_similarity("abc", "abc"), 1.0);
        assert_eq!(normalized_similarity("", ""), 1.0);
        assert!(normalized_similarity("kitten", "sitting") > 0.5);
        assert!(normalized_similarity("abc", "xyz") < 0.5);
    }

    #[test]
    fn similarity_counts_characters_not_bytes() {
        // One substitution over five characters.
        assert_eq!(normalized_similarity("mädch", "madch"), 0.8);
    }

    #[test]
    fn test_compare_case_and_whitespace_insensitive() {
        let result = compare_answers("  HeLLo   World ", "hello world", 0.8);
        assert!(result.is_correct);
        assert!(result.exact);
        assert_eq!(result.similarity, 1.0);
    }

    #[test]
    fn test_compare_fuzzy_accepts_minor_typo() {
        let result = compare_answers("bonjuor", "bonjour", 0.8);
        assert!(!result.is_correct, "a transposition costs two edits");

        let result = compare_answers("accomodate", "accommodate", 0.8);
        assert!(result.is_correct);
        assert!(!result.exact);
    }

    #[test]
    fn test_compare_threshold_is_strict() {
        // Exactly 0.8 similarity is not enough.
        let result = compare_answers("helo", "hello", 0.8);
        assert_eq!(result.similarity, 0.8);
        assert!(!result.is_correct);
    }

    #[test]
    fn test_compare_rejects_wrong_answer() {
        let result = compare_answers("xyz", "hello", 0.8);
        assert!(!result.is_correct);
    }
}

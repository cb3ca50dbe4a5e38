//! Lexical Tokenization
//!
//! Reduces a note's raw text to the set of significant words used for
//! lexical-overlap scoring: maximal runs of alphabetic characters of length
//! >= 3, lowercased, with a fixed stopword set removed. The token set is
//! used only to compute Jaccard overlap between candidate neighbor pairs;
//! it never feeds the embedding model.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Minimum token length (in characters) kept by [`tokenize`]
pub const MIN_TOKEN_LEN: usize = 3;

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| {
        [
            "the", "and", "are", "for", "from", "has", "its", "that", "was",
            "were", "will", "with", "this", "but", "they", "have", "had",
            "what", "when", "where", "who", "which", "why", "how", "not",
            "you", "your", "can", "all", "any", "into", "than", "then",
            "them", "these", "those", "there", "here", "also", "such", "more",
            "most", "other", "some", "only", "over", "same", "each", "about",
        ]
        .into_iter()
        .collect()
    })
}

/// Tokenize text into its set of significant words.
///
/// Pure and deterministic: no I/O, no ordering dependence. Non-alphabetic
/// characters act as separators, so "k8s-cluster" yields only "cluster".
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|s| s.chars().count() >= MIN_TOKEN_LEN)
        .map(|s| s.to_lowercase())
        .filter(|s| !stop_words().contains(s.as_str()))
        .collect()
}

/// Jaccard overlap between two token sets: `|a ∩ b| / max(1, |a ∪ b|)`.
///
/// The `max(1, ..)` guard means two empty sets overlap at 0.0, not NaN.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f32 / union.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_filters_short() {
        let tokens = tokenize("Kubernetes IS a WONDERFUL go tool");
        assert!(tokens.contains("kubernetes"));
        assert!(tokens.contains("wonderful"));
        assert!(tokens.contains("tool"));
        // "IS", "a", "go" are shorter than 3 chars
        assert!(!tokens.contains("is"));
        assert!(!tokens.contains("go"));
    }

    #[test]
    fn test_tokenize_removes_stopwords() {
        let tokens = tokenize("the cat and the hat with them");
        assert!(tokens.contains("cat"));
        assert!(tokens.contains("hat"));
        assert!(!tokens.contains("the"));
        assert!(!tokens.contains("and"));
        assert!(!tokens.contains("with"));
        assert!(!tokens.contains("them"));
    }

    #[test]
    fn test_tokenize_splits_on_non_alphabetic() {
        let tokens = tokenize("front-matter v2.0 foo_bar");
        assert!(tokens.contains("front"));
        assert!(tokens.contains("matter"));
        assert!(tokens.contains("foo"));
        assert!(tokens.contains("bar"));
        // digits never survive
        assert!(tokens.iter().all(|t| t.chars().all(|c| c.is_alphabetic())));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // "où" is two characters but three UTF-8 bytes
        let tokens = tokenize("où est le chat café");
        assert!(!tokens.contains("où"));
        assert!(tokens.contains("est"));
        assert!(tokens.contains("chat"));
        assert!(tokens.contains("café"));
        for t in &tokens {
            assert!(t.chars().count() >= MIN_TOKEN_LEN, "short token survived: {t}");
        }
    }

    #[test]
    fn test_no_short_tokens_or_stopwords_survive() {
        let tokens = tokenize("How do I deploy nginx pods in my cluster when it breaks");
        for t in &tokens {
            assert!(t.len() >= MIN_TOKEN_LEN, "short token survived: {t}");
            assert!(!stop_words().contains(t.as_str()), "stopword survived: {t}");
        }
    }

    #[test]
    fn test_jaccard() {
        let a = tokenize("apple banana cherry");
        let b = tokenize("banana cherry durian");
        // intersection 2, union 4
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-6);

        let empty = HashSet::new();
        assert_eq!(jaccard(&empty, &empty), 0.0);
        assert_eq!(jaccard(&a, &a), 1.0);
    }
}

//! Keyword extraction for relevance scoring.
//!
//! Normalizes free text into the set of significant tokens used by the
//! retriever: lowercase, punctuation stripped, whitespace-split, stopwords
//! and very short tokens removed. Intentionally dumb — no stemming, no
//! synonym expansion — so scoring stays deterministic and explainable.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Minimum token length (exclusive) for a token to count as a keyword.
const MIN_TOKEN_LEN: usize = 2;

/// Pronouns, articles, common prepositions/conjunctions, and conversational
/// filler that carry no retrieval signal.
static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "being",
        "have", "has", "had", "do", "does", "did", "will", "would", "should",
        "can", "could", "may", "might", "must", "i", "you", "he", "she", "it",
        "we", "they", "me", "him", "her", "us", "them", "my", "your", "his",
        "its", "our", "their", "mine", "yours", "hers", "ours", "theirs",
        "to", "of", "in", "on", "at", "for", "with", "about", "against",
        "between", "into", "through", "during", "before", "after", "above",
        "below", "from", "up", "down", "out", "over", "under", "again",
        "further", "then", "once", "here", "there", "when", "where", "why",
        "how", "all", "any", "both", "each", "few", "more", "most", "other",
        "some", "such", "no", "nor", "not", "only", "own", "same", "so",
        "than", "too", "very", "s", "t", "just", "don", "shouldve", "now",
        "what", "tell", "give", "explain", "whats", "who", "whom",
    ]
    .into_iter()
    .collect()
});

/// Extract the set of significant keywords from `text`.
///
/// Duplicates collapse and ordering is irrelevant. Punctuation-only and
/// empty input yield the empty set. Deterministic for a fixed input.
pub fn extract(text: &str) -> HashSet<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_TOKEN_LEN && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_is_deterministic() {
        let text = "The launch was delayed because of Q3 budget concerns!";
        assert_eq!(extract(text), extract(text));
    }

    #[test]
    fn lowercases_and_strips_punctuation() {
        let kws = extract("Budget, BUDGET... budget?!");
        assert_eq!(kws.len(), 1);
        assert!(kws.contains("budget"));
    }

    #[test]
    fn drops_stopwords_and_short_tokens() {
        let kws = extract("tell me about the delay in Q3");
        assert!(kws.contains("delay"));
        // "q3" has only two characters and is dropped by the length rule.
        assert!(!kws.contains("q3"));
        assert!(!kws.contains("the"));
        assert!(!kws.contains("about"));
        assert!(!kws.contains("tell"));
    }

    #[test]
    fn empty_and_punctuation_only_yield_empty_set() {
        assert!(extract("").is_empty());
        assert!(extract("?!... —-- ,,,").is_empty());
        assert!(extract("   \t\n").is_empty());
    }

    #[test]
    fn underscores_survive_as_word_characters() {
        let kws = extract("check user_input handling");
        assert!(kws.contains("user_input"));
    }

    #[test]
    fn duplicates_collapse() {
        let kws = extract("delay delay delay launch");
        assert_eq!(kws.len(), 2);
    }
}

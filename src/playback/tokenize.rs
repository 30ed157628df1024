//! Word tokenizing for the playback entry points.
//!
//! Both entry points lowercase their input and split it on word boundaries
//! (`\b\w+\b`); punctuation disappears, contractions split at the
//! apostrophe.

use std::sync::OnceLock;

use regex::Regex;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w+\b").expect("valid word pattern"))
}

/// Split free text into lowercase word tokens.
///
/// ```
/// use sign_bridge::playback::tokenize;
///
/// assert_eq!(tokenize("Hello, World!"), vec!["hello", "world"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    word_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Tokens present in `current` but not in `previous`.
///
/// Used by the live-text entry point to play only what the user just
/// typed.  The result is in first-occurrence order of `current` with
/// duplicates removed, making the iteration order deterministic.
pub fn added_tokens(previous: &str, current: &str) -> Vec<String> {
    let old: std::collections::HashSet<String> = tokenize(previous).into_iter().collect();

    let mut seen = std::collections::HashSet::new();
    tokenize(current)
        .into_iter()
        .filter(|token| !old.contains(token) && seen.insert(token.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_folds_and_strips_punctuation() {
        assert_eq!(tokenize("Hello, World!"), vec!["hello", "world"]);
    }

    #[test]
    fn empty_and_punctuation_only_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("?!... ---").is_empty());
    }

    #[test]
    fn numbers_are_word_tokens() {
        assert_eq!(tokenize("see 2 of you"), vec!["see", "2", "of", "you"]);
    }

    #[test]
    fn contractions_split_at_the_apostrophe() {
        assert_eq!(tokenize("it's"), vec!["it", "s"]);
    }

    #[test]
    fn added_tokens_are_the_new_words_only() {
        assert_eq!(
            added_tokens("see you", "see you tomorrow night"),
            vec!["tomorrow", "night"]
        );
    }

    #[test]
    fn added_tokens_keep_first_occurrence_order() {
        assert_eq!(
            added_tokens("", "night became family"),
            vec!["night", "became", "family"]
        );
    }

    #[test]
    fn added_tokens_dedupes_repeats() {
        assert_eq!(added_tokens("", "no no no yes no"), vec!["no", "yes"]);
    }

    #[test]
    fn removed_words_produce_nothing() {
        assert!(added_tokens("see you tomorrow", "see you").is_empty());
    }

    #[test]
    fn diff_is_case_insensitive() {
        assert!(added_tokens("Hello", "hello").is_empty());
    }
}

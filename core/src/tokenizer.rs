use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)[\p{L}\p{N}]+").expect("valid regex");
}

/// Minimum term length (in characters) for a token to be indexed or matched.
/// The tokenizer itself keeps shorter tokens so query parsing can reject them
/// explicitly.
pub const MIN_TERM_CHARS: usize = 2;

/// How tokenization treats letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseMode {
    /// Fold to lowercase before splitting. The indexing default.
    #[default]
    Insensitive,
    /// Keep the input casing. Used for case-sensitive query matching.
    Sensitive,
}

/// Tokenize text into normalized terms using NFKC normalization and lowercase
/// folding. Every maximal run of Unicode letters and numbers becomes one
/// token; punctuation and whitespace only separate. Works for any script, not
/// just ASCII.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with(text, CaseMode::Insensitive)
}

/// Tokenize with explicit case handling.
pub fn tokenize_with(text: &str, case: CaseMode) -> Vec<String> {
    let normalized: String = text.nfkc().collect();
    let normalized = match case {
        CaseMode::Insensitive => normalized.to_lowercase(),
        CaseMode::Sensitive => normalized,
    };
    WORD.find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Tokenize and deduplicate, preserving first-seen order. Query parsing uses
/// this so a repeated query term is scored once.
pub fn tokenize_unique(text: &str, case: CaseMode) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize_with(text, case)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
///
/// Plain substring counting: "low" also matches inside "lower". Term
/// statistics and scoring depend on this approximation, so it stays a
/// substring count rather than a token-exact one.
pub fn count_occurrences(haystack: &str, needle: &str) -> u32 {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count() as u32
}

/// Character offsets (not byte offsets) of each non-overlapping occurrence of
/// `needle` in `haystack`.
pub fn char_offsets_of(haystack: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    let mut offsets = Vec::new();
    let mut chars_before = 0usize;
    let mut last_byte = 0usize;
    for (byte_idx, _) in haystack.match_indices(needle) {
        chars_before += haystack[last_byte..byte_idx].chars().count();
        offsets.push(chars_before);
        last_byte = byte_idx;
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation_and_keeps_unicode() {
        let toks = tokenize("Café, naïve-2021!");
        assert_eq!(toks, vec!["café", "naïve", "2021"]);
    }

    #[test]
    fn keeps_short_tokens() {
        // Length filtering is the caller's job.
        let toks = tokenize("a to x1");
        assert_eq!(toks, vec!["a", "to", "x1"]);
    }

    #[test]
    fn case_sensitive_mode_preserves_casing() {
        let toks = tokenize_with("Hello World", CaseMode::Sensitive);
        assert_eq!(toks, vec!["Hello", "World"]);
    }

    #[test]
    fn unique_preserves_first_seen_order() {
        let toks = tokenize_unique("apple banana Apple cherry", CaseMode::Insensitive);
        assert_eq!(toks, vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn counts_substring_occurrences() {
        assert_eq!(count_occurrences("low lower below", "low"), 3);
        assert_eq!(count_occurrences("abc", ""), 0);
        assert_eq!(count_occurrences("", "abc"), 0);
    }

    #[test]
    fn char_offsets_are_character_based() {
        // "é" is multi-byte; offsets must still count characters.
        assert_eq!(char_offsets_of("café au café", "café"), vec![0, 8]);
        assert_eq!(char_offsets_of("aaa", "aa"), vec![0]);
    }
}

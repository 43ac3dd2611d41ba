use docsearch_core::tokenizer::{tokenize, tokenize_with, CaseMode};

#[test]
fn it_normalizes_and_folds_case() {
    let toks = tokenize("The Café's MENU.");
    assert_eq!(toks, vec!["the", "café", "s", "menu"]);
}

#[test]
fn it_splits_any_script() {
    // No ASCII-only assumption: Cyrillic and CJK runs survive as tokens.
    let toks = tokenize("привет, 世界! hello");
    assert_eq!(toks, vec!["привет", "世界", "hello"]);
}

#[test]
fn it_returns_nothing_for_punctuation_only_input() {
    assert!(tokenize("...---!!!").is_empty());
    assert!(tokenize("").is_empty());
}

#[test]
fn sensitive_mode_distinguishes_case() {
    let upper = tokenize_with("Rust", CaseMode::Sensitive);
    let lower = tokenize_with("Rust", CaseMode::Insensitive);
    assert_eq!(upper, vec!["Rust"]);
    assert_eq!(lower, vec!["rust"]);
}

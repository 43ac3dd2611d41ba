//! Conjunctive retrieval, relevance ranking and excerpt generation.
//!
//! Candidate selection intersects the posting sets of every query term that
//! has postings (all-terms-must-match; there is no implicit OR). Scoring and
//! match locations run against documents fetched fresh from the store, so a
//! result that fails to load is silently excluded rather than failing the
//! whole search.

use std::collections::HashMap;

use docsearch_core::tokenizer::{char_offsets_of, tokenize_unique, CaseMode, MIN_TERM_CHARS};
use docsearch_core::{DocId, DocMeta};
use serde::Serialize;

use crate::error::EngineError;
use crate::events::SearchNotification;
use crate::service::EngineInner;

/// Default maximum number of results returned by a search.
pub const DEFAULT_RESULT_LIMIT: usize = 50;

const EXCERPT_RADIUS: usize = 60;
const EXCERPT_MAX_CHARS: usize = 150;

const TITLE_WEIGHT: f32 = 10.0;
const TITLE_EXACT_BONUS: f32 = 20.0;
const TAG_WEIGHT: f32 = 7.0;
const TAG_EXACT_BONUS: f32 = 14.0;
const CONTENT_WEIGHT_CAP: f32 = 10.0;
const RARITY_WEIGHT: f32 = 5.0;
const DF_RARITY_HORIZON: f32 = 100.0;
const MAX_SCORE: f32 = 100.0;

/// Sort order for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Descending relevance score. The default.
    #[default]
    Relevance,
    /// Descending number of match locations.
    MatchCount,
    /// Lexicographic title order.
    Title,
}

impl SortBy {
    /// Parse a caller-supplied sort key. Unknown keys fall back to relevance;
    /// search never fails over a presentation option.
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "" | "relevance" => SortBy::Relevance,
            "matches" | "match_count" | "matchcount" => SortBy::MatchCount,
            "title" => SortBy::Title,
            other => {
                tracing::debug!(key = other, "unknown sort key; falling back to relevance");
                SortBy::Relevance
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum results returned after sorting.
    pub limit: usize,
    /// Keep only documents whose cached path equals this value.
    pub path: Option<String>,
    /// Score and surface tag matches.
    pub include_tags: bool,
    /// Fetch content for scoring, excerpts and content match locations. When
    /// off, candidates are ranked from metadata alone and no excerpt is made.
    pub include_content: bool,
    /// Match occurrences, locations and excerpts with exact casing. Candidate
    /// retrieval always runs against the case-folded index.
    pub case_sensitive: bool,
    pub sort_by: SortBy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
            path: None,
            include_tags: true,
            include_content: true,
            case_sensitive: false,
            sort_by: SortBy::Relevance,
        }
    }
}

/// Where one query term matched within a document, as character offsets
/// grouped by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermMatches {
    pub term: String,
    pub title_offsets: Vec<usize>,
    pub content_offsets: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: DocId,
    pub title: String,
    pub path: String,
    pub tags: Vec<String>,
    /// Relevance score, clamped to [0, 100].
    pub score: f32,
    /// Context around the earliest content match. Absent when content was not
    /// fetched.
    pub excerpt: Option<String>,
    pub matches: Vec<TermMatches>,
}

impl SearchResult {
    /// Total match locations across all terms and fields.
    pub fn match_count(&self) -> usize {
        self.matches
            .iter()
            .map(|m| m.title_offsets.len() + m.content_offsets.len())
            .sum()
    }
}

struct QueryTerm {
    /// The term as typed (after tokenization), used for matching.
    raw: String,
    /// Lower-cased form, used against the case-folded index.
    folded: String,
}

pub(crate) fn execute_search(
    inner: &EngineInner,
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<SearchResult>, EngineError> {
    if !inner.state.read().initialized {
        return Err(EngineError::NotInitialized);
    }
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let case = if options.case_sensitive {
        CaseMode::Sensitive
    } else {
        CaseMode::Insensitive
    };
    let terms: Vec<QueryTerm> = tokenize_unique(query, case)
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_TERM_CHARS)
        .map(|raw| {
            let folded = raw.to_lowercase();
            QueryTerm { raw, folded }
        })
        .collect();
    if terms.is_empty() {
        return Ok(Vec::new());
    }

    // Candidate selection runs under the read lock; documents are fetched
    // only after it is dropped.
    let (metas, df_by_term, candidate_count) = {
        let state = inner.state.read();
        let mut posting_sets = Vec::new();
        for term in &terms {
            if let Some(postings) = state.index.postings_for(&term.folded) {
                posting_sets.push(postings);
            }
        }
        if posting_sets.is_empty() {
            (Vec::new(), HashMap::new(), 0)
        } else {
            // Intersect starting from the smallest posting set.
            posting_sets.sort_by_key(|p| p.len());
            let (first, rest) = posting_sets.split_first().expect("non-empty");
            let candidates: Vec<&DocId> = first
                .keys()
                .filter(|id| rest.iter().all(|p| p.contains_key(*id)))
                .collect();
            let candidate_count = candidates.len();
            let metas: Vec<DocMeta> = candidates
                .into_iter()
                .filter_map(|id| state.cache.get(id).cloned())
                .filter(|m| options.path.as_deref().map_or(true, |p| m.path == p))
                .collect();
            let df_by_term: HashMap<String, usize> = terms
                .iter()
                .filter_map(|t| {
                    state
                        .index
                        .stats_for(&t.folded)
                        .map(|s| (t.folded.clone(), s.document_count))
                })
                .collect();
            (metas, df_by_term, candidate_count)
        }
    };

    let mut results: Vec<SearchResult> = metas
        .iter()
        .filter_map(|meta| assemble_result(inner, meta, &terms, &df_by_term, options))
        .collect();

    match options.sort_by {
        SortBy::Relevance => results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        SortBy::MatchCount => results.sort_by(|a, b| b.match_count().cmp(&a.match_count())),
        SortBy::Title => results.sort_by(|a, b| a.title.cmp(&b.title)),
    }
    results.truncate(options.limit);

    let _ = inner.notifications.send(SearchNotification {
        query: query.to_string(),
        result_count: results.len(),
        candidate_count,
    });
    Ok(results)
}

fn assemble_result(
    inner: &EngineInner,
    meta: &DocMeta,
    terms: &[QueryTerm],
    df_by_term: &HashMap<String, usize>,
    options: &SearchOptions,
) -> Option<SearchResult> {
    let doc = if options.include_content {
        match inner.store.get_by_id(&meta.id) {
            Ok(doc) => Some(doc),
            Err(err) => {
                tracing::debug!(id = %meta.id, %err, "excluding result; document failed to load");
                return None;
            }
        }
    } else {
        None
    };

    let fold = !options.case_sensitive;
    let title = doc
        .as_ref()
        .map(|d| d.title.clone())
        .unwrap_or_else(|| meta.title.clone());
    let title_hay = if fold { title.to_lowercase() } else { title.clone() };
    let content_hay = doc.as_ref().map(|d| {
        if fold {
            d.content.to_lowercase()
        } else {
            d.content.clone()
        }
    });
    let tags_hay: Vec<String> = if fold {
        meta.tags.iter().map(|t| t.to_lowercase()).collect()
    } else {
        meta.tags.clone()
    };

    let mut score = 0.0f32;
    let mut matches = Vec::with_capacity(terms.len());
    let mut first_match: Option<(usize, usize)> = None;

    for term in terms {
        let title_offsets = char_offsets_of(&title_hay, &term.raw);
        if !title_offsets.is_empty() {
            score += TITLE_WEIGHT;
            if title_hay == term.raw {
                score += TITLE_EXACT_BONUS;
            }
        }

        if options.include_tags {
            if tags_hay.iter().any(|tag| tag.contains(&term.raw)) {
                score += TAG_WEIGHT;
            }
            if tags_hay.iter().any(|tag| tag == &term.raw) {
                score += TAG_EXACT_BONUS;
            }
        }

        let content_offsets = match &content_hay {
            Some(hay) => char_offsets_of(hay, &term.raw),
            None => Vec::new(),
        };
        // Capped so keyword stuffing cannot dominate the score.
        score += (content_offsets.len() as f32).min(CONTENT_WEIGHT_CAP);
        if let Some(&pos) = content_offsets.first() {
            if first_match.map_or(true, |(cur, _)| pos < cur) {
                first_match = Some((pos, term.raw.chars().count()));
            }
        }

        // Crude inverse-document-frequency proxy: rarer terms score higher.
        if let Some(&df) = df_by_term.get(&term.folded) {
            score += RARITY_WEIGHT * (1.0 - (df as f32 / DF_RARITY_HORIZON).min(1.0));
        }

        matches.push(TermMatches {
            term: term.raw.clone(),
            title_offsets,
            content_offsets,
        });
    }

    let excerpt = doc.as_ref().map(|d| build_excerpt(&d.content, first_match));

    Some(SearchResult {
        id: meta.id.clone(),
        title,
        path: meta.path.clone(),
        tags: meta.tags.clone(),
        score: score.clamp(0.0, MAX_SCORE),
        excerpt,
        matches,
    })
}

/// Cut a window around the earliest match, widened back to a whitespace
/// boundary so the excerpt does not open mid-word, with ellipses wherever the
/// window stops short of a document boundary. All arithmetic is in
/// characters. Without a match the document's leading characters are used.
fn build_excerpt(content: &str, first_match: Option<(usize, usize)>) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.is_empty() {
        return String::new();
    }

    let (start, end) = match first_match {
        None => (0, chars.len().min(EXCERPT_MAX_CHARS)),
        Some((pos, term_len)) => {
            let mut start = pos.saturating_sub(EXCERPT_RADIUS);
            while start > 0 && !chars[start].is_whitespace() {
                start -= 1;
            }
            if chars[start].is_whitespace() {
                start += 1;
            }
            let mut end = (pos + term_len + EXCERPT_RADIUS).min(chars.len());
            if end - start > EXCERPT_MAX_CHARS {
                end = start + EXCERPT_MAX_CHARS;
            }
            (start, end)
        }
    };

    let mut excerpt = String::new();
    if start > 0 {
        excerpt.push('…');
    }
    excerpt.extend(&chars[start..end]);
    if end < chars.len() {
        excerpt.push('…');
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_parsing_falls_back_to_relevance() {
        assert_eq!(SortBy::parse("title"), SortBy::Title);
        assert_eq!(SortBy::parse("match_count"), SortBy::MatchCount);
        assert_eq!(SortBy::parse("RELEVANCE"), SortBy::Relevance);
        assert_eq!(SortBy::parse("bogus"), SortBy::Relevance);
        assert_eq!(SortBy::parse(""), SortBy::Relevance);
    }

    #[test]
    fn excerpt_without_match_takes_leading_characters() {
        let content = "a".repeat(300);
        let excerpt = build_excerpt(&content, None);
        assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS + 1);
        assert!(excerpt.ends_with('…'));
        assert!(!excerpt.starts_with('…'));
    }

    #[test]
    fn excerpt_of_short_document_has_no_ellipses() {
        let excerpt = build_excerpt("short note", Some((0, 5)));
        assert_eq!(excerpt, "short note");
    }

    #[test]
    fn excerpt_opens_on_a_word_boundary_with_ellipses() {
        // Match lands at character 504 of a ~1000 character document.
        let filler = "lorem ipsum ".repeat(42);
        let content = format!("{filler}needle {}", "tail words ".repeat(40));
        let excerpt = build_excerpt(&content, Some((504, 6)));

        assert!(excerpt.starts_with('…'));
        assert!(excerpt.ends_with('…'));
        assert!(excerpt.contains("needle"));
        // Window start widened back to the space before "lorem", never
        // mid-word.
        let after_ellipsis = excerpt.chars().nth(1).unwrap();
        assert!(!after_ellipsis.is_whitespace());
        assert!(excerpt.contains("…lorem"));
        assert!(excerpt.chars().count() <= EXCERPT_MAX_CHARS + 2);
    }

    #[test]
    fn excerpt_is_capped() {
        let content = "x".repeat(2000);
        let excerpt = build_excerpt(&content, Some((1000, 1)));
        assert!(excerpt.chars().count() <= EXCERPT_MAX_CHARS + 2);
    }
}

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::DocId;

/// Aggregate statistics for one indexed term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TermStats {
    /// Number of documents whose posting set contains the term.
    pub document_count: usize,
    /// Sum of raw content occurrences across all posting documents.
    pub occurrence_count: u64,
}

#[derive(Debug, Default)]
struct TermEntry {
    /// doc id -> raw occurrence count recorded when the document was indexed.
    /// Storing the per-document contribution is what lets removal restore the
    /// aggregate exactly.
    postings: HashMap<DocId, u32>,
    occurrence_count: u64,
}

/// In-memory inverted index: term -> posting map, plus per-term statistics
/// and a reverse map so removing a document touches only its own terms.
///
/// All operations are synchronous and lock-free; callers serialize access
/// (the engine wraps the index and the metadata cache behind one `RwLock`).
/// Nothing here is persisted: the index is rebuilt from the document store.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    terms: HashMap<String, TermEntry>,
    doc_terms: HashMap<DocId, HashSet<String>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a posting. `occurrences` is the raw substring
    /// occurrence count of the term in the document's content at index time.
    pub fn add_posting(&mut self, term: &str, doc_id: &str, occurrences: u32) {
        let entry = self.terms.entry(term.to_string()).or_default();
        let old = entry.postings.insert(doc_id.to_string(), occurrences);
        entry.occurrence_count =
            entry.occurrence_count - u64::from(old.unwrap_or(0)) + u64::from(occurrences);
        self.doc_terms
            .entry(doc_id.to_string())
            .or_default()
            .insert(term.to_string());
    }

    /// Remove a posting. Idempotent: removing a non-member is a no-op. Once a
    /// term's posting map empties, the term entry is dropped entirely so no
    /// stale zero-count statistics linger.
    pub fn remove_posting(&mut self, term: &str, doc_id: &str) {
        self.remove_posting_entry(term, doc_id);
        if let Some(set) = self.doc_terms.get_mut(doc_id) {
            set.remove(term);
            if set.is_empty() {
                self.doc_terms.remove(doc_id);
            }
        }
    }

    /// Drop every posting for `doc_id`. Safe to call on an unknown id.
    pub fn remove_document(&mut self, doc_id: &str) {
        if let Some(terms) = self.doc_terms.remove(doc_id) {
            for term in terms {
                self.remove_posting_entry(&term, doc_id);
            }
            tracing::trace!(doc_id, "document removed from index");
        }
    }

    fn remove_posting_entry(&mut self, term: &str, doc_id: &str) {
        if let Some(entry) = self.terms.get_mut(term) {
            if let Some(occ) = entry.postings.remove(doc_id) {
                entry.occurrence_count -= u64::from(occ);
            }
            if entry.postings.is_empty() {
                self.terms.remove(term);
            }
        }
    }

    /// Posting map for a term: doc id -> recorded occurrence count.
    pub fn postings_for(&self, term: &str) -> Option<&HashMap<DocId, u32>> {
        self.terms.get(term).map(|e| &e.postings)
    }

    pub fn stats_for(&self, term: &str) -> Option<TermStats> {
        self.terms.get(term).map(|e| TermStats {
            document_count: e.postings.len(),
            occurrence_count: e.occurrence_count,
        })
    }

    /// Terms currently posting to a document.
    pub fn terms_for_doc(&self, doc_id: &str) -> Option<&HashSet<String>> {
        self.doc_terms.get(doc_id)
    }

    pub fn document_count(&self) -> usize {
        self.doc_terms.len()
    }

    pub fn unique_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn clear(&mut self) {
        self.terms.clear();
        self.doc_terms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_stats() {
        let mut idx = InvertedIndex::new();
        idx.add_posting("rust", "d1", 3);
        idx.add_posting("rust", "d2", 1);

        let stats = idx.stats_for("rust").unwrap();
        assert_eq!(stats.document_count, 2);
        assert_eq!(stats.occurrence_count, 4);
        assert_eq!(idx.postings_for("rust").unwrap().len(), 2);
    }

    #[test]
    fn overwrite_adjusts_occurrences() {
        let mut idx = InvertedIndex::new();
        idx.add_posting("rust", "d1", 3);
        idx.add_posting("rust", "d1", 5);

        let stats = idx.stats_for("rust").unwrap();
        assert_eq!(stats.document_count, 1);
        assert_eq!(stats.occurrence_count, 5);
    }

    #[test]
    fn remove_last_posting_drops_term() {
        let mut idx = InvertedIndex::new();
        idx.add_posting("rust", "d1", 2);
        idx.remove_posting("rust", "d1");

        // No zero-count entries survive.
        assert!(idx.stats_for("rust").is_none());
        assert!(idx.postings_for("rust").is_none());
        assert_eq!(idx.unique_terms(), 0);
        assert_eq!(idx.document_count(), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut idx = InvertedIndex::new();
        idx.add_posting("rust", "d1", 1);
        idx.remove_posting("rust", "d2");
        idx.remove_posting("other", "d1");

        assert_eq!(idx.stats_for("rust").unwrap().document_count, 1);
    }

    #[test]
    fn remove_document_touches_only_its_terms() {
        let mut idx = InvertedIndex::new();
        idx.add_posting("rust", "d1", 2);
        idx.add_posting("tokio", "d1", 1);
        idx.add_posting("rust", "d2", 1);

        idx.remove_document("d1");

        assert!(idx.terms_for_doc("d1").is_none());
        assert!(idx.stats_for("tokio").is_none());
        let stats = idx.stats_for("rust").unwrap();
        assert_eq!(stats.document_count, 1);
        assert_eq!(stats.occurrence_count, 1);
    }

    #[test]
    fn index_remove_round_trip_leaves_no_residue() {
        let mut idx = InvertedIndex::new();
        idx.add_posting("alpha", "keep", 1);

        idx.add_posting("alpha", "temp", 4);
        idx.add_posting("beta", "temp", 2);
        idx.remove_document("temp");

        assert_eq!(idx.unique_terms(), 1);
        assert_eq!(idx.document_count(), 1);
        let stats = idx.stats_for("alpha").unwrap();
        assert_eq!(stats.document_count, 1);
        assert_eq!(stats.occurrence_count, 1);
        assert!(idx.stats_for("beta").is_none());
    }

    #[test]
    fn remove_unknown_document_is_noop() {
        let mut idx = InvertedIndex::new();
        idx.remove_document("ghost");
        assert_eq!(idx.document_count(), 0);
    }
}

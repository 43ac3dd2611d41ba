//! Full-corpus rebuild and single-document (re-)indexing.
//!
//! Re-indexing is always remove-then-insert rather than a diff, so no stale
//! posting can survive a content edit. Occurrence counts are raw substring
//! counts over the lower-cased content: a term that is a substring of a
//! longer word is overcounted, and scoring downstream relies on exactly this
//! approximation.

use std::collections::HashSet;
use std::sync::Arc;

use docsearch_core::tokenizer::{count_occurrences, tokenize, MIN_TERM_CHARS};
use docsearch_core::DocMeta;

use crate::error::EngineError;
use crate::service::{EngineInner, IndexState};
use crate::store::Document;

/// Index one document into the locked state. The caller holds the write lock.
///
/// Title and content are tokenized separately and unioned with the document's
/// lower-cased tags; terms shorter than the indexing minimum are dropped
/// here, not in the tokenizer.
pub(crate) fn index_document_locked(state: &mut IndexState, doc: &Document) -> anyhow::Result<()> {
    if doc.id.is_empty() {
        anyhow::bail!("document has an empty id");
    }

    remove_document_locked(state, &doc.id);

    let content_lc = doc.content.to_lowercase();
    let tags_lc: Vec<String> = doc.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut terms: HashSet<String> = HashSet::new();
    terms.extend(tokenize(&doc.title));
    terms.extend(tokenize(&doc.content));
    terms.extend(tags_lc);

    for term in terms {
        if term.chars().count() < MIN_TERM_CHARS {
            continue;
        }
        let occurrences = count_occurrences(&content_lc, &term);
        state.index.add_posting(&term, &doc.id, occurrences);
    }

    state.cache.put(DocMeta {
        id: doc.id.clone(),
        title: doc.title.clone(),
        path: doc.path.clone(),
        tags: doc.tags.clone(),
    });
    Ok(())
}

/// Drop a document's postings and cache entry. No-op on unknown ids.
pub(crate) fn remove_document_locked(state: &mut IndexState, doc_id: &str) {
    state.index.remove_document(doc_id);
    state.cache.remove(doc_id);
}

/// Clear and rebuild the whole index from the document store.
///
/// The corpus is indexed in batches of `config.batch_size`, yielding between
/// batches so a rebuild never blocks the host for the duration of the whole
/// corpus. A document that fails to index is logged and skipped; only a
/// wholesale listing failure aborts.
pub(crate) async fn rebuild_all(inner: &Arc<EngineInner>) -> Result<(), EngineError> {
    let docs = inner.store.list_all().map_err(EngineError::Store)?;
    let total = docs.len();

    {
        let mut state = inner.state.write();
        state.index.clear();
        state.cache.clear();
    }

    let batch_size = inner.config.batch_size.max(1);
    let mut indexed = 0usize;
    for batch in docs.chunks(batch_size) {
        {
            let mut state = inner.state.write();
            for doc in batch {
                match index_document_locked(&mut state, doc) {
                    Ok(()) => indexed += 1,
                    Err(err) => {
                        tracing::warn!(id = %doc.id, %err, "skipping document during rebuild")
                    }
                }
            }
        }
        tokio::task::yield_now().await;
    }

    let version = {
        let mut state = inner.state.write();
        state.version += 1;
        state.initialized = true;
        state.version
    };
    tracing::info!(indexed, total, version, "index rebuild complete");
    Ok(())
}

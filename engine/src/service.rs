use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use docsearch_core::{DocCache, InvertedIndex};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{DocumentEvent, SearchNotification};
use crate::pipeline;
use crate::query::{self, SearchOptions, SearchResult};
use crate::queue::{self, QueueState};
use crate::store::{Document, DocumentStore};

/// Index structures behind the single exclusive lock: mutation takes it in
/// write mode, queries in read mode. No document-store I/O ever happens while
/// it is held.
pub(crate) struct IndexState {
    pub(crate) index: InvertedIndex,
    pub(crate) cache: DocCache,
    pub(crate) version: u64,
    pub(crate) initialized: bool,
}

pub(crate) struct EngineInner {
    pub(crate) config: EngineConfig,
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) state: RwLock<IndexState>,
    pub(crate) queue: Mutex<QueueState>,
    pub(crate) disposed: AtomicBool,
    pub(crate) notifications: broadcast::Sender<SearchNotification>,
}

/// Snapshot of the index observability counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IndexStats {
    pub indexed_documents: usize,
    pub unique_terms: usize,
    pub index_version: u64,
    pub pending_documents: usize,
}

/// Document search engine: an in-memory inverted index over an external
/// document store, kept fresh by a batched incremental pipeline.
///
/// An engine is constructed explicitly per corpus and passed around by
/// handle; clones are cheap and share the same index. The index lives only in
/// process memory and is rebuilt from the store on `initialize`.
#[derive(Clone)]
pub struct SearchEngine {
    inner: Arc<EngineInner>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        let (notifications, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(EngineInner {
                config,
                store,
                state: RwLock::new(IndexState {
                    index: InvertedIndex::new(),
                    cache: DocCache::new(),
                    version: 0,
                    initialized: false,
                }),
                queue: Mutex::new(QueueState::default()),
                disposed: AtomicBool::new(false),
                notifications,
            }),
        }
    }

    /// Build the index from the document store. Must complete before the
    /// first `search`. Yields between batches, so the host stays responsive
    /// while a large corpus is indexed.
    pub async fn initialize(&self) -> Result<(), EngineError> {
        pipeline::rebuild_all(&self.inner).await
    }

    /// Run a query against the current index snapshot.
    ///
    /// Queries never wait for pending incremental work: if a drain batch is
    /// mid-flight, the result may be stale by up to one drain cycle. That
    /// staleness window is deliberate — it bounds query latency at the cost
    /// of eventual (not immediate) consistency with the document store.
    pub fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, EngineError> {
        query::execute_search(&self.inner, query, options)
    }

    /// Index (or re-index) a document synchronously, bypassing the queue.
    pub fn index_document(&self, doc: &Document) {
        let mut state = self.inner.state.write();
        match pipeline::index_document_locked(&mut state, doc) {
            Ok(()) => state.version += 1,
            Err(err) => tracing::warn!(id = %doc.id, %err, "failed to index document"),
        }
    }

    /// Remove a document synchronously. No-op on unknown ids.
    pub fn remove_document_from_index(&self, doc_id: &str) {
        let mut state = self.inner.state.write();
        pipeline::remove_document_locked(&mut state, doc_id);
        state.version += 1;
    }

    /// Defer (re-)indexing of a document. Pending ids are deduplicated and
    /// drained in batches after a short delay; the caller never blocks on
    /// index work. Must be called inside a tokio runtime.
    pub fn queue_document_for_indexing(&self, doc_id: &str) {
        queue::enqueue(self.inner.clone(), doc_id);
    }

    /// Apply one document lifecycle event. Saves and metadata updates are
    /// deferred through the queue; deletions take effect immediately so the
    /// index never serves postings for documents that no longer exist.
    pub fn handle_event(&self, event: DocumentEvent) {
        match event {
            DocumentEvent::Saved(id) | DocumentEvent::MetadataUpdated(id) => {
                self.queue_document_for_indexing(&id)
            }
            DocumentEvent::Deleted(id) => self.remove_document_from_index(&id),
        }
    }

    /// Channel for the document-store side to push lifecycle events through.
    /// A forwarder task consumes the channel for the life of the sender.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<DocumentEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let engine = self.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if engine.inner.disposed.load(Ordering::Acquire) {
                    break;
                }
                engine.handle_event(event);
            }
        });
        tx
    }

    /// Subscribe to result-ready notifications emitted after each search.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<SearchNotification> {
        self.inner.notifications.subscribe()
    }

    pub fn index_stats(&self) -> IndexStats {
        let pending_documents = self.inner.queue.lock().pending_len();
        let state = self.inner.state.read();
        IndexStats {
            indexed_documents: state.cache.len(),
            unique_terms: state.index.unique_terms(),
            index_version: state.version,
            pending_documents,
        }
    }

    /// Freshness signal: bumped once per rebuild, per drained batch and per
    /// immediate removal. Monotonic, never rolled back.
    pub fn index_version(&self) -> u64 {
        self.inner.state.read().version
    }

    /// Clear all in-memory structures and cancel any pending drain. The
    /// engine requires a fresh `initialize` before it can search again.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::Release);
        self.inner.queue.lock().clear();
        let mut state = self.inner.state.write();
        state.index.clear();
        state.cache.clear();
        state.initialized = false;
        tracing::debug!("search engine disposed");
    }
}

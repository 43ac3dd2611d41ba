//! Deferred, batched incremental indexing.
//!
//! Two states: Idle and Draining. The first enqueue on an idle queue spawns a
//! drain task that sleeps for `config.drain_delay`, so rapid edit bursts
//! coalesce into one batch. Enqueues while draining only append; one pending
//! drain is always enough. The drain re-schedules itself while work remains,
//! which is how an arbitrary backlog converges without ever blocking the
//! caller that triggered the enqueue.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use docsearch_core::DocId;

use crate::pipeline;
use crate::service::EngineInner;
use crate::store::Document;

#[derive(Debug, Default)]
pub(crate) struct QueueState {
    pending: VecDeque<DocId>,
    /// Mirror of `pending` for the at-most-once invariant.
    members: HashSet<DocId>,
    draining: bool,
}

impl QueueState {
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
        self.members.clear();
        self.draining = false;
    }
}

/// Add a document id to the queue. Enqueueing an already-queued id is a
/// no-op. Must run inside a tokio runtime: the transition from Idle spawns
/// the drain task.
pub(crate) fn enqueue(inner: Arc<EngineInner>, doc_id: &str) {
    if inner.disposed.load(Ordering::Acquire) {
        return;
    }
    let schedule = {
        let mut queue = inner.queue.lock();
        if !queue.members.insert(doc_id.to_string()) {
            false
        } else {
            queue.pending.push_back(doc_id.to_string());
            if queue.draining {
                false
            } else {
                queue.draining = true;
                true
            }
        }
    };
    if schedule {
        tokio::spawn(drain_loop(inner));
    }
}

async fn drain_loop(inner: Arc<EngineInner>) {
    loop {
        tokio::time::sleep(inner.config.drain_delay).await;

        if inner.disposed.load(Ordering::Acquire) {
            inner.queue.lock().clear();
            return;
        }

        let batch: Vec<DocId> = {
            let mut queue = inner.queue.lock();
            let take = inner.config.batch_size.max(1).min(queue.pending.len());
            let batch: Vec<DocId> = queue.pending.drain(..take).collect();
            for id in &batch {
                queue.members.remove(id);
            }
            batch
        };
        if batch.is_empty() {
            inner.queue.lock().draining = false;
            return;
        }

        // Fetch outside the index lock, then apply the whole batch under it.
        let mut fetched: Vec<(DocId, Option<Document>)> = Vec::with_capacity(batch.len());
        for id in batch {
            match inner.store.get_by_id(&id) {
                Ok(doc) => fetched.push((id, Some(doc))),
                Err(err) => {
                    tracing::debug!(%id, %err, "queued document failed to load; dropping from index");
                    fetched.push((id, None));
                }
            }
        }

        let (applied, version) = {
            let mut state = inner.state.write();
            let mut applied = 0usize;
            for (id, doc) in fetched {
                pipeline::remove_document_locked(&mut state, &id);
                if let Some(doc) = doc {
                    match pipeline::index_document_locked(&mut state, &doc) {
                        Ok(()) => applied += 1,
                        Err(err) => {
                            tracing::warn!(id = %doc.id, %err, "failed to index queued document")
                        }
                    }
                }
            }
            state.version += 1;
            (applied, state.version)
        };
        tracing::debug!(applied, version, "incremental batch committed");

        let done = {
            let mut queue = inner.queue.lock();
            if queue.pending.is_empty() {
                queue.draining = false;
                true
            } else {
                false
            }
        };
        if done {
            return;
        }
    }
}

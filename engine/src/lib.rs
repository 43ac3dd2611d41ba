//! In-process document search: an in-memory inverted index over an external
//! document store, built once at startup and kept fresh through a deferred,
//! batched incremental-indexing queue, with conjunctive multi-term retrieval,
//! weighted relevance ranking and contextual excerpts.
//!
//! The engine owns no documents — the store is the source of truth and the
//! index is rebuilt from it at every `initialize`. Nothing is persisted.
//!
//! Consistency model: deletions apply immediately; saves and metadata updates
//! coalesce in the queue and land with the next drain, so queries may observe
//! an index that is stale by up to one drain cycle. Queries never block on
//! pending index work.

mod config;
mod error;
mod events;
mod pipeline;
mod query;
mod queue;
mod service;
mod store;

pub use config::EngineConfig;
pub use error::EngineError;
pub use events::{DocumentEvent, SearchNotification};
pub use query::{SearchOptions, SearchResult, SortBy, TermMatches, DEFAULT_RESULT_LIMIT};
pub use service::{IndexStats, SearchEngine};
pub use store::{Document, DocumentStore};

use serde::Serialize;

/// Document lifecycle notifications the engine consumes.
///
/// The document-store side calls `SearchEngine::handle_event` directly, or
/// sends these through the channel returned by `SearchEngine::event_sender`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// Content was saved; the document is re-indexed (deferred, batched).
    Saved(String),
    /// The document was deleted; its postings are dropped immediately so the
    /// index never serves documents that no longer exist.
    Deleted(String),
    /// Title, tags or path changed; re-indexed (deferred, batched).
    MetadataUpdated(String),
}

/// Emitted on the notification channel after each completed search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchNotification {
    pub query: String,
    /// Results returned to the caller, after sorting and truncation.
    pub result_count: usize,
    /// Candidates that matched every query term, before filtering and
    /// truncation.
    pub candidate_count: usize,
}

use anyhow::Result;
use time::OffsetDateTime;

/// A document as owned by the external document store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub path: String,
    pub updated_at: OffsetDateTime,
}

/// Read-only view of the external document store.
///
/// The engine consults the store and never mutates it. Implementations may
/// perform blocking I/O; the engine never calls them while holding the index
/// lock.
pub trait DocumentStore: Send + Sync {
    /// Every document in the corpus. Used only by full rebuilds.
    fn list_all(&self) -> Result<Vec<Document>>;

    /// Fetch one document, failing if it does not exist or cannot be read.
    fn get_by_id(&self, id: &str) -> Result<Document>;
}

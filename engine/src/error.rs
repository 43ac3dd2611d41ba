use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// `search` was called before `initialize` completed. The one hard
    /// failure in this subsystem: it indicates a host programming error, not
    /// a data condition.
    #[error("search engine is not initialized")]
    NotInitialized,

    /// The document store failed wholesale (a full listing could not be
    /// obtained during rebuild). Per-document failures are logged and skipped
    /// instead.
    #[error("document store error: {0}")]
    Store(anyhow::Error),
}

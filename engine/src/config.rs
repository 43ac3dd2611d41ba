use std::time::Duration;

/// Tunables for the indexing pipeline and the incremental queue.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Documents indexed per batch, both during a full rebuild (the rebuild
    /// yields between batches) and per incremental drain cycle.
    pub batch_size: usize,
    /// Delay before a scheduled drain runs, so bursts of rapid edits coalesce
    /// into one batch.
    pub drain_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            drain_delay: Duration::from_millis(100),
        }
    }
}

//! Scheduler tuning knobs.

/// Fixed sizing for one scheduler instance.
///
/// All values are set at construction and never change while the scheduler
/// runs; restarting reuses the same configuration.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Number of dispatch tasks in the worker pool.
    pub pool_size: usize,
    /// Items per page when reading the backlog.
    pub page_size: u64,
    /// Bound addresses scanned per fetch call before handing control back
    /// to the dispatch path.
    pub fetch_batch: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            page_size: 64,
            fetch_batch: 4,
        }
    }
}

//! Hand-off seam between the worker pool and the real processing pipeline.

use crate::item::PendingItem;

/// Verdict returned by the external processing logic for one item.
///
/// The scheduler never requeues on its own: a failed item is simply gone
/// unless the processor explicitly asks for the pair to be retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Item was handled; nothing further to do.
    Committed,
    /// Processing failed but the pair stays eligible for future fetches.
    Failed,
    /// Processing failed and the (sender, receiver) pair must be
    /// blacklisted so the fetcher stops re-enqueueing it.
    Retire,
}

/// Contract-execution entry point invoked by each dispatch task.
///
/// Implementations run verification / VM execution / block production, all
/// outside this crate. `process` is called with one item at a time and owns
/// the item for its duration; the worker blocks until it returns.
pub trait ContractProcessor: Send + Sync {
    fn process(&self, item: &PendingItem) -> ProcessOutcome;
}

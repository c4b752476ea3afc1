//! Scheduler-level errors.

use crate::store::StoreError;
use crate::types::Gid;
use thiserror::Error;

/// Errors returned when constructing a scheduler.
///
/// Lifecycle transitions themselves are infallible: `start` and `stop` are
/// idempotent and never error.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The group has no bound contract addresses; no scheduler is created.
    #[error("no contract addresses bound to group {0}")]
    EmptyAddressList(Gid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

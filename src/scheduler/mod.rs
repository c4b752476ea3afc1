//! Contract-dispatch scheduler: lifecycle controller, dispatch loop,
//! two-level priority queue, paging fetcher, worker pool, and pair blacklist.

pub mod blacklist;
pub mod contract;
pub mod fetcher;
pub mod queue;
pub mod worker;

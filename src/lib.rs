pub mod config;
pub mod error;
pub mod item;
pub mod keystore;
pub mod ledger;
pub mod message;
pub mod processor;
pub mod rpc_error;
pub mod scheduler;
pub mod store;
pub mod types;

// Re-export the pieces most callers need.
pub use config::DispatchConfig;
pub use error::SchedulerError;
pub use item::PendingItem;
pub use processor::{ContractProcessor, ProcessOutcome};
pub use scheduler::contract::{ContractScheduler, DispatchStats, SchedulerState};
pub use store::{BacklogStore, QuotaAccessor};

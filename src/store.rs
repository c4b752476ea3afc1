//! Seams consumed from the backing store and ledger layer.
//!
//! The scheduler never owns persistence: it reads the unconfirmed backlog in
//! pages, resolves account quotas, and registers an arrival callback. All of
//! that is expressed as traits so nodes can plug their storage engine in and
//! tests can run against an in-memory double.

use crate::item::PendingItem;
use crate::types::{Address, Gid, Hash, TokenId};
use thiserror::Error;

/// Callback invoked by the store when new items arrive for a group.
pub type ArrivalCallback = Box<dyn Fn() + Send + Sync>;

/// Errors surfaced by the backing store.
///
/// During a fetch pass these are logged and demoted to "no more data in this
/// page"; they only propagate out of construction-time queries.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown consensus group {0}")]
    UnknownGroup(Gid),
    #[error("unknown account {0}")]
    UnknownAccount(Address),
    #[error("unknown token {0}")]
    UnknownToken(TokenId),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Per-token aggregate inside an account's unconfirmed metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMeta {
    pub token: TokenId,
    pub total_amount: u128,
}

/// Aggregate view of an account's unconfirmed backlog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconfirmedMeta {
    pub total_number: u64,
    pub tokens: Vec<TokenMeta>,
}

/// Ledger-registered token metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub token: TokenId,
    pub symbol: String,
    pub decimals: u8,
}

/// Query/subscribe contract of the persistent unconfirmed-items store.
pub trait BacklogStore: Send + Sync {
    /// Ordered list of contract addresses bound to a consensus group.
    fn addr_list_by_gid(&self, gid: Gid) -> Result<Vec<Address>, StoreError>;

    /// One page of the pending backlog for `address`.
    ///
    /// `page_index` counts pages of `page_size` items from the head of the
    /// backlog; an empty vector means the backlog is exhausted at that point.
    fn unconfirmed_blocks(
        &self,
        page_index: u64,
        page_size: u64,
        address: Address,
    ) -> Result<Vec<PendingItem>, StoreError>;

    /// Aggregate unconfirmed metadata for one account.
    fn unconfirmed_meta(&self, address: Address) -> Result<UnconfirmedMeta, StoreError>;

    /// Ledger metadata for a token id.
    fn token_info(&self, token: TokenId) -> Result<TokenInfo, StoreError>;

    /// Register the new-arrival callback for a group. At most one listener
    /// per group; registering again replaces the previous callback.
    fn add_contract_listener(&self, gid: Gid, callback: ArrivalCallback);

    /// Remove the group's arrival callback, if any.
    fn remove_contract_listener(&self, gid: Gid);
}

/// Quota accessor used for both receiver and sender priorities.
pub trait QuotaAccessor: Send + Sync {
    /// Resource quota of `address` as of the given snapshot, used directly
    /// as the scheduling priority value.
    fn account_quota(&self, address: Address, snapshot: Hash) -> u64;
}

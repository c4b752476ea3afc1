//! Pending work-item representation shared by all scheduler stages.

use crate::types::{data_hash, Address, Hash, TokenId};
use serde::{Deserialize, Serialize};

/// One inbound value-transfer request awaiting contract-side processing.
///
/// Items are loaded from the backing store during a fetch pass, inserted into
/// the priority queue once, and popped at most once. They are immutable after
/// creation; the scheduler never rewrites or requeues them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingItem {
    /// Sender account that initiated the transfer.
    pub sender: Address,
    /// Receiving contract account.
    pub receiver: Address,
    /// Hash of the source block that carries the request.
    pub source_block: Hash,
    /// Token being transferred.
    pub token: TokenId,
    /// Transfer amount, in the token's smallest unit.
    pub amount: u128,
}

impl PendingItem {
    /// Identity key used to keep the queue free of duplicate items.
    ///
    /// Two items are the same request iff sender, receiver, and source block
    /// all match; amount and token are derived from the block and add nothing.
    pub fn dispatch_key(&self) -> Hash {
        data_hash(&[
            self.sender.as_bytes(),
            self.receiver.as_bytes(),
            self.source_block.as_bytes(),
        ])
    }

    /// Blacklist key for this item's (sender, receiver) pair.
    pub fn pair_key(&self) -> Hash {
        pair_key(self.sender, self.receiver)
    }
}

/// Deterministic key over a (sender, receiver) pair.
pub fn pair_key(sender: Address, receiver: Address) -> Hash {
    data_hash(&[sender.as_bytes(), receiver.as_bytes()])
}

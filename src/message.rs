//! Ledger-sync wire messages exchanged with peers.
//!
//! These are the request/response shapes the sync layer moves around; the
//! scheduler core never touches them. Encoded as MessagePack.

use crate::item::PendingItem;
use crate::types::{Address, Hash};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("wire encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("wire decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Encode/decode contract shared by every sync message.
pub trait WireMessage: Serialize + DeserializeOwned {
    fn encode(&self) -> Result<Vec<u8>, WireError> {
        Ok(rmp_serde::to_vec(self)?)
    }

    fn decode(buf: &[u8]) -> Result<Self, WireError> {
        Ok(rmp_serde::from_slice(buf)?)
    }
}

/// Chain position referenced by range requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashHeight {
    pub hash: Hash,
    pub height: u64,
}

/// Request a range of one account's blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAccountBlocks {
    pub address: Address,
    pub from: HashHeight,
    pub count: u64,
    pub forward: bool,
}

/// Response carrying one account's pending records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBlocks {
    pub address: Address,
    pub blocks: Vec<PendingItem>,
}

/// Request a range of snapshot-chain positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSnapshotBlocks {
    pub from: HashHeight,
    pub count: u64,
    pub forward: bool,
}

/// Response carrying snapshot-chain positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotBlocks {
    pub blocks: Vec<HashHeight>,
}

impl WireMessage for GetAccountBlocks {}
impl WireMessage for AccountBlocks {}
impl WireMessage for GetSnapshotBlocks {}
impl WireMessage for SnapshotBlocks {}

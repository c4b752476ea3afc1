//! Pair blacklist suppressing re-dispatch of a (sender, receiver) pair.

use crate::item::pair_key;
use crate::types::Address;
use crate::types::Hash;
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::debug;

/// Concurrent set keyed by the deterministic hash of (sender, receiver).
///
/// Owns its own lock, independent of the queue lock: `contains` sits on the
/// hot fetch path and must not contend with queue mutation. Entries never
/// expire; they are added and removed explicitly by callers.
#[derive(Debug, Default)]
pub struct PairBlacklist {
    set: RwLock<HashSet<Hash>>,
}

impl PairBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, sender: Address, receiver: Address) {
        debug!(%sender, %receiver, "blacklisting pair");
        self.set.write().insert(pair_key(sender, receiver));
    }

    pub fn remove(&self, sender: Address, receiver: Address) {
        debug!(%sender, %receiver, "removing pair from blacklist");
        self.set.write().remove(&pair_key(sender, receiver));
    }

    pub fn contains(&self, sender: Address, receiver: Address) -> bool {
        self.set.read().contains(&pair_key(sender, receiver))
    }

    pub fn len(&self) -> usize {
        self.set.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ADDRESS_SIZE;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; ADDRESS_SIZE])
    }

    #[test]
    fn add_remove_contains() {
        let blacklist = PairBlacklist::new();
        assert!(!blacklist.contains(addr(1), addr(2)));

        blacklist.add(addr(1), addr(2));
        assert!(blacklist.contains(addr(1), addr(2)));
        // Direction matters: the reverse pair is a different key.
        assert!(!blacklist.contains(addr(2), addr(1)));

        blacklist.remove(addr(1), addr(2));
        assert!(!blacklist.contains(addr(1), addr(2)));
        assert!(blacklist.is_empty());
    }

    #[test]
    fn add_is_idempotent() {
        let blacklist = PairBlacklist::new();
        blacklist.add(addr(3), addr(4));
        blacklist.add(addr(3), addr(4));
        assert_eq!(blacklist.len(), 1);
    }
}

//! Two-level priority queue over pending items.
//!
//! Items are grouped into one bucket per receiver; buckets are ordered by the
//! receiver's quota, items within a bucket by the sender's quota. `pop_highest`
//! always returns the item with the lexicographically highest
//! (receiver priority, sender priority) key. Equal priorities resolve by a
//! queue-wide insertion sequence so pop order is deterministic: earliest
//! inserted wins, at both levels.
//!
//! The structure is not internally synchronized; the scheduler wraps it in a
//! single mutex so bulk inserts from the fetcher and pops from dispatch are
//! each atomic critical sections.

use crate::item::PendingItem;
use crate::types::{Address, Hash};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

/// One queued item inside a receiver bucket, ordered by sender priority.
#[derive(Debug)]
struct QueuedItem {
    sender_priority: u64,
    seq: u64,
    item: PendingItem,
}

impl Ord for QueuedItem {
    /// Max-heap on sender priority; among equals the earliest sequence wins.
    fn cmp(&self, other: &Self) -> Ordering {
        self.sender_priority
            .cmp(&other.sender_priority)
            .then_with(|| Reverse(self.seq).cmp(&Reverse(other.seq)))
    }
}

impl PartialOrd for QueuedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedItem {}

/// Top-level ordering key of a receiver bucket.
///
/// `priority` is the receiver's quota snapshot taken when the bucket was
/// (re)built; `order` is the reversed creation sequence so that among equal
/// priorities the bucket created first sorts last in the `BTreeMap` and is
/// therefore popped first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct BucketKey {
    priority: u64,
    order: Reverse<u64>,
}

/// All currently queued items destined for one receiver.
#[derive(Debug)]
struct ReceiverBucket {
    receiver: Address,
    items: BinaryHeap<QueuedItem>,
}

/// Two-level priority queue; see the module docs for the ordering contract.
#[derive(Debug, Default)]
pub struct TwoLevelQueue {
    /// Buckets ordered by (receiver priority, creation order); the last
    /// entry is the highest-priority bucket. Empty buckets are removed
    /// eagerly, so every stored bucket holds at least one item.
    buckets: BTreeMap<BucketKey, ReceiverBucket>,
    /// Receiver address to live bucket key, for insert-side lookup.
    index: HashMap<Address, BucketKey>,
    /// Dispatch keys of everything currently queued; rejects duplicates of
    /// the same (sender, receiver, source-block) triple.
    queued: HashSet<Hash>,
    /// Monotonic insertion counter shared by both ordering levels.
    next_seq: u64,
    len: usize,
}

impl TwoLevelQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one item under the given priority snapshot values.
    ///
    /// Creates the receiver's bucket with `receiver_priority` if none exists;
    /// an existing bucket keeps the priority it was created with, so the
    /// passed value is ignored until the bucket empties and is rebuilt.
    ///
    /// Returns `false` when an identical item is already queued.
    pub fn insert_new(
        &mut self,
        item: PendingItem,
        receiver_priority: u64,
        sender_priority: u64,
    ) -> bool {
        if !self.queued.insert(item.dispatch_key()) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;

        let key = *self.index.entry(item.receiver).or_insert(BucketKey {
            priority: receiver_priority,
            order: Reverse(seq),
        });
        self.buckets
            .entry(key)
            .or_insert_with(|| ReceiverBucket {
                receiver: item.receiver,
                items: BinaryHeap::new(),
            })
            .items
            .push(QueuedItem {
                sender_priority,
                seq,
                item,
            });
        self.len += 1;
        true
    }

    /// Remove and return the single highest-priority item.
    ///
    /// Drops the owning bucket once it empties; a later insert for the same
    /// receiver re-snapshots its priority.
    pub fn pop_highest(&mut self) -> Option<PendingItem> {
        let mut entry = self.buckets.last_entry()?;
        let queued = entry
            .get_mut()
            .items
            .pop()
            .expect("queue never stores an empty bucket");
        if entry.get().items.is_empty() {
            let receiver = entry.get().receiver;
            entry.remove();
            self.index.remove(&receiver);
        }
        self.len -= 1;
        self.queued.remove(&queued.item.dispatch_key());
        Some(queued.item)
    }

    /// Total queued items across all buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TokenId, ADDRESS_SIZE, HASH_SIZE, TOKEN_ID_SIZE};

    fn item(sender: u8, receiver: u8, block: u8) -> PendingItem {
        PendingItem {
            sender: Address::from_bytes([sender; ADDRESS_SIZE]),
            receiver: Address::from_bytes([receiver; ADDRESS_SIZE]),
            source_block: Hash::from_bytes([block; HASH_SIZE]),
            token: TokenId::from_bytes([0; TOKEN_ID_SIZE]),
            amount: 1,
        }
    }

    fn pair_of(item: &PendingItem) -> (Address, Address) {
        (item.sender, item.receiver)
    }

    #[test]
    fn pops_by_receiver_then_sender_priority() {
        // Scenario: R1 (priority 10) holds S1 prio 5 and S2 prio 8;
        // R2 (priority 20) holds S3 prio 1. Expected: (R2,S3), (R1,S2), (R1,S1).
        let mut queue = TwoLevelQueue::new();
        let r1_s1 = item(1, 11, 1);
        let r1_s2 = item(2, 11, 2);
        let r2_s3 = item(3, 12, 3);
        assert!(queue.insert_new(r1_s1.clone(), 10, 5));
        assert!(queue.insert_new(r1_s2.clone(), 10, 8));
        assert!(queue.insert_new(r2_s3.clone(), 20, 1));
        assert_eq!(queue.len(), 3);

        let order: Vec<_> = std::iter::from_fn(|| queue.pop_highest())
            .map(|i| pair_of(&i))
            .collect();
        assert_eq!(
            order,
            vec![pair_of(&r2_s3), pair_of(&r1_s2), pair_of(&r1_s1)]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_priorities_resolve_fifo() {
        let mut queue = TwoLevelQueue::new();
        // Same receiver, same sender priority: insertion order decides.
        let first = item(1, 9, 1);
        let second = item(2, 9, 2);
        queue.insert_new(first.clone(), 7, 3);
        queue.insert_new(second.clone(), 7, 3);
        assert_eq!(queue.pop_highest().unwrap(), first);
        assert_eq!(queue.pop_highest().unwrap(), second);

        // Two receivers with equal priority: the bucket created first wins.
        let early = item(1, 21, 3);
        let late = item(1, 22, 4);
        queue.insert_new(early.clone(), 5, 1);
        queue.insert_new(late.clone(), 5, 1);
        assert_eq!(queue.pop_highest().unwrap().receiver, early.receiver);
        assert_eq!(queue.pop_highest().unwrap().receiver, late.receiver);
    }

    #[test]
    fn duplicate_triples_are_rejected() {
        let mut queue = TwoLevelQueue::new();
        assert!(queue.insert_new(item(1, 2, 3), 4, 4));
        assert!(!queue.insert_new(item(1, 2, 3), 4, 4));
        assert_eq!(queue.len(), 1);

        // Popping frees the key for a later re-insert.
        queue.pop_highest().unwrap();
        assert!(queue.insert_new(item(1, 2, 3), 4, 4));
    }

    #[test]
    fn each_pop_removes_exactly_one() {
        let mut queue = TwoLevelQueue::new();
        for block in 0..5 {
            queue.insert_new(item(block, 30, block), u64::from(block), 1);
        }
        for remaining in (0..5).rev() {
            assert!(queue.pop_highest().is_some());
            assert_eq!(queue.len(), remaining);
        }
        assert!(queue.pop_highest().is_none());
    }

    #[test]
    fn bucket_priority_is_a_snapshot() {
        let mut queue = TwoLevelQueue::new();
        // Bucket for receiver 40 created with priority 1.
        queue.insert_new(item(1, 40, 1), 1, 1);
        // A later insert claims priority 100 but the live bucket keeps 1,
        // so the priority-50 receiver still wins.
        queue.insert_new(item(2, 40, 2), 100, 1);
        queue.insert_new(item(3, 41, 3), 50, 1);
        assert_eq!(
            queue.pop_highest().unwrap().receiver,
            Address::from_bytes([41; ADDRESS_SIZE])
        );

        // Drain receiver 40; once its bucket is rebuilt the fresh snapshot
        // applies.
        queue.pop_highest().unwrap();
        queue.pop_highest().unwrap();
        queue.insert_new(item(4, 40, 4), 100, 1);
        queue.insert_new(item(5, 41, 5), 50, 1);
        assert_eq!(
            queue.pop_highest().unwrap().receiver,
            Address::from_bytes([40; ADDRESS_SIZE])
        );
    }
}

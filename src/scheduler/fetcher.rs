//! Paging fetch from the backing store into the priority queue.

use crate::config::DispatchConfig;
use crate::scheduler::blacklist::PairBlacklist;
use crate::scheduler::queue::TwoLevelQueue;
use crate::store::{BacklogStore, QuotaAccessor};
use crate::types::{Address, Hash};
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Cursor-driven scan over the bound address list.
///
/// Each `fetch_batch` call covers one batch of addresses starting at the
/// saved cursor, so repeated calls progress around the list instead of
/// restarting; the cursor wraps to 0 once a full pass completes. Per address
/// the backing store is read in fixed-size pages. Backing-store errors end
/// the current page; the scheduler degrades to idle rather than terminating.
///
/// The queue lock is only taken for the bulk insert after a page is resolved,
/// never across a store or quota call.
pub struct BacklogFetcher {
    addresses: Vec<Address>,
    cursor: usize,
    page_size: u64,
    batch: usize,
    /// Snapshot context quotas are resolved against, fixed at construction.
    snapshot: Hash,
}

impl BacklogFetcher {
    pub fn new(addresses: Vec<Address>, config: &DispatchConfig, snapshot: Hash) -> Self {
        Self {
            addresses,
            cursor: 0,
            page_size: config.page_size.max(1),
            batch: config.fetch_batch.max(1),
            snapshot,
        }
    }

    /// Scan one batch of addresses, enqueueing every non-blacklisted item.
    ///
    /// Returns `true` when this call completed a full pass over the bound
    /// address list, so callers can tell "truly empty" apart from "scan still
    /// in progress".
    pub fn fetch_batch(
        &mut self,
        store: &dyn BacklogStore,
        quota: &dyn QuotaAccessor,
        blacklist: &PairBlacklist,
        queue: &Mutex<TwoLevelQueue>,
    ) -> bool {
        let end = (self.cursor + self.batch).min(self.addresses.len());
        for index in self.cursor..end {
            self.fetch_address(self.addresses[index], store, quota, blacklist, queue);
        }
        self.cursor = end;
        if self.cursor >= self.addresses.len() {
            self.cursor = 0;
            return true;
        }
        false
    }

    fn fetch_address(
        &self,
        address: Address,
        store: &dyn BacklogStore,
        quota: &dyn QuotaAccessor,
        blacklist: &PairBlacklist,
        queue: &Mutex<TwoLevelQueue>,
    ) {
        let mut page_index = 0u64;
        loop {
            let page = match store.unconfirmed_blocks(page_index, self.page_size, address) {
                Ok(page) => page,
                Err(error) => {
                    warn!(%address, page_index, %error, "backlog page read failed");
                    break;
                }
            };
            if page.is_empty() {
                break;
            }
            let last_page = (page.len() as u64) < self.page_size;

            // Resolve quotas before touching the queue lock.
            let mut resolved = Vec::with_capacity(page.len());
            for item in page {
                if blacklist.contains(item.sender, item.receiver) {
                    debug!(sender = %item.sender, receiver = %item.receiver, "skipping blacklisted pair");
                    continue;
                }
                let receiver_priority = quota.account_quota(item.receiver, self.snapshot);
                let sender_priority = quota.account_quota(item.sender, self.snapshot);
                resolved.push((item, receiver_priority, sender_priority));
            }
            if !resolved.is_empty() {
                let mut queue = queue.lock();
                for (item, receiver_priority, sender_priority) in resolved {
                    queue.insert_new(item, receiver_priority, sender_priority);
                }
            }

            if last_page {
                break;
            }
            page_index += 1;
        }
    }
}

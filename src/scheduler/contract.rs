//! Contract-dispatch scheduler: lifecycle state machine and dispatch loop.
//!
//! One scheduler instance serves one consensus group. `start` subscribes to
//! arrival notifications, spawns the worker pool and the dispatch loop;
//! `stop` tears everything down behind a barrier and leaves the instance
//! restartable. The dispatch loop never orders items itself, it only decides
//! when workers are invited to pull; ordering lives entirely in the
//! two-level priority queue.

use crate::config::DispatchConfig;
use crate::error::SchedulerError;
use crate::item::PendingItem;
use crate::processor::ContractProcessor;
use crate::scheduler::blacklist::PairBlacklist;
use crate::scheduler::fetcher::BacklogFetcher;
use crate::scheduler::queue::TwoLevelQueue;
use crate::scheduler::worker::{DispatchTask, TaskState, TaskWaker};
use crate::store::{BacklogStore, QuotaAccessor};
use crate::types::{Address, Gid, Hash};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Lifecycle state; `Stopped` is not terminal, restart is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Created,
    Running,
    Stopped,
}

/// Point-in-time view of the scheduler for logging and tests.
#[derive(Debug, Clone)]
pub struct DispatchStats {
    pub queued_items: usize,
    pub blacklisted_pairs: usize,
    pub task_states: Vec<TaskState>,
}

/// State shared between the dispatch loop, the worker pool, and the
/// scheduler facade: the queue, the paging fetcher, and the blacklist.
pub(crate) struct DispatchShared {
    queue: Mutex<TwoLevelQueue>,
    fetcher: Mutex<BacklogFetcher>,
    blacklist: PairBlacklist,
    store: Arc<dyn BacklogStore>,
    quota: Arc<dyn QuotaAccessor>,
}

impl DispatchShared {
    /// Dispatch callback: hand out the single highest-priority item.
    ///
    /// Pops under the queue lock when the queue is non-empty; otherwise runs
    /// one paging-fetch batch and retries. Returns `None` only once a fetch
    /// completed a full pass over the bound address list without the queue
    /// gaining any item, meaning the backlog is truly empty for now.
    pub(crate) fn dispatch_one(&self) -> Option<PendingItem> {
        loop {
            if let Some(item) = self.queue.lock().pop_highest() {
                return Some(item);
            }
            let full_pass = self.fetcher.lock().fetch_batch(
                self.store.as_ref(),
                self.quota.as_ref(),
                &self.blacklist,
                &self.queue,
            );
            if !self.queue.lock().is_empty() {
                continue;
            }
            if full_pass {
                return None;
            }
        }
    }

    pub(crate) fn queued_len(&self) -> usize {
        self.queue.lock().len()
    }

    pub(crate) fn blacklist(&self) -> &PairBlacklist {
        &self.blacklist
    }
}

/// Wake signal given to the store's arrival listener and to `start` calls on
/// an already-running scheduler. Only fires while the dispatch loop is
/// parked; a loop that is mid-sweep will observe the new items anyway.
struct WakeHandle {
    sleeping: Arc<AtomicBool>,
    wake_tx: Sender<()>,
}

impl WakeHandle {
    fn wake(&self) {
        if self.sleeping.load(Ordering::SeqCst) {
            let _ = self.wake_tx.try_send(());
        }
    }
}

/// Channels and threads that exist only while the scheduler is running.
struct SchedulerRuntime {
    wake_tx: Sender<()>,
    stop_tx: Sender<()>,
    ack_rx: Receiver<()>,
    loop_handle: JoinHandle<()>,
    tasks: Vec<DispatchTask>,
}

struct DispatchLoop {
    shared: Arc<DispatchShared>,
    sleeping: Arc<AtomicBool>,
    wakers: Vec<TaskWaker>,
    wake_rx: Receiver<()>,
    stop_rx: Receiver<()>,
    ack_tx: Sender<()>,
}

impl DispatchLoop {
    /// Invite workers to pull work whenever work may exist; otherwise park.
    fn run(self) {
        debug!("dispatch loop running");
        loop {
            self.sleeping.store(false, Ordering::SeqCst);
            if self.stop_rx.try_recv().is_ok() {
                break;
            }
            for waker in &self.wakers {
                waker.wake();
                if self.shared.queued_len() == 0 {
                    break;
                }
            }
            if self.shared.queued_len() == 0 {
                self.sleeping.store(true, Ordering::SeqCst);
                select! {
                    recv(self.wake_rx) -> _ => {}
                    recv(self.stop_rx) -> _ => break,
                }
            } else {
                // Workers are still draining; give them the CPU.
                thread::yield_now();
            }
        }
        debug!("dispatch loop exiting");
        let _ = self.ack_tx.send(());
    }
}

/// Scheduler feeding pending contract calls of one group to a bounded pool
/// of dispatch tasks.
pub struct ContractScheduler {
    gid: Gid,
    address: Address,
    config: DispatchConfig,
    processor: Arc<dyn ContractProcessor>,
    shared: Arc<DispatchShared>,
    /// Single serialization point for `start`/`stop` races.
    state: Mutex<SchedulerState>,
    sleeping: Arc<AtomicBool>,
    runtime: Mutex<Option<SchedulerRuntime>>,
}

impl ContractScheduler {
    /// Build a scheduler for `gid`, binding the group's address list.
    ///
    /// Fails when the group has no bound contract addresses; no instance is
    /// created in that case and nothing is spawned.
    pub fn new(
        gid: Gid,
        address: Address,
        snapshot: Hash,
        config: DispatchConfig,
        store: Arc<dyn BacklogStore>,
        quota: Arc<dyn QuotaAccessor>,
        processor: Arc<dyn ContractProcessor>,
    ) -> Result<ContractScheduler, SchedulerError> {
        let addresses = store.addr_list_by_gid(gid)?;
        if addresses.is_empty() {
            return Err(SchedulerError::EmptyAddressList(gid));
        }
        info!(%gid, %address, bound = addresses.len(), "contract scheduler created");
        let fetcher = BacklogFetcher::new(addresses, &config, snapshot);
        Ok(ContractScheduler {
            gid,
            address,
            config,
            processor,
            shared: Arc::new(DispatchShared {
                queue: Mutex::new(TwoLevelQueue::new()),
                fetcher: Mutex::new(fetcher),
                blacklist: PairBlacklist::new(),
                store,
                quota,
            }),
            state: Mutex::new(SchedulerState::Created),
            sleeping: Arc::new(AtomicBool::new(false)),
            runtime: Mutex::new(None),
        })
    }

    /// Start dispatching. Idempotent: a second call on a running scheduler
    /// only forces one extra dispatch pass.
    pub fn start(&self) {
        let mut state = self.state.lock();
        info!(gid = %self.gid, current = ?*state, "start requested");
        if *state == SchedulerState::Running {
            // Awake it so an external trigger still causes one pass.
            self.wake();
            return;
        }

        let (wake_tx, wake_rx) = bounded::<()>(1);
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let (ack_tx, ack_rx) = bounded::<()>(0);
        self.sleeping.store(false, Ordering::SeqCst);

        let listener = WakeHandle {
            sleeping: self.sleeping.clone(),
            wake_tx: wake_tx.clone(),
        };
        self.shared
            .store
            .add_contract_listener(self.gid, Box::new(move || listener.wake()));

        let tasks: Vec<DispatchTask> = (0..self.config.pool_size.max(1))
            .map(|index| DispatchTask::spawn(index, self.shared.clone(), self.processor.clone()))
            .collect();
        let wakers = tasks.iter().map(DispatchTask::waker).collect();

        let dispatch = DispatchLoop {
            shared: self.shared.clone(),
            sleeping: self.sleeping.clone(),
            wakers,
            wake_rx,
            stop_rx,
            ack_tx,
        };
        let loop_handle = thread::Builder::new()
            .name(format!("contract-dispatch-{}", self.gid))
            .spawn(move || dispatch.run())
            .expect("failed to spawn dispatch loop");

        *self.runtime.lock() = Some(SchedulerRuntime {
            wake_tx,
            stop_tx,
            ack_rx,
            loop_handle,
            tasks,
        });
        *state = SchedulerState::Running;
        info!(gid = %self.gid, "contract scheduler started");
    }

    /// Stop dispatching. Idempotent and infallible; blocks until the
    /// dispatch loop acknowledged termination and every task has returned.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        info!(gid = %self.gid, current = ?*state, "stop requested");
        if *state != SchedulerState::Running {
            return;
        }
        let Some(runtime) = self.runtime.lock().take() else {
            warn!(gid = %self.gid, "running scheduler had no runtime");
            *state = SchedulerState::Stopped;
            return;
        };
        let SchedulerRuntime {
            wake_tx,
            stop_tx,
            ack_rx,
            loop_handle,
            tasks,
        } = runtime;

        // Rendezvous with the loop: it picks this up at the top of its body
        // or while parked, then acknowledges on its way out.
        let _ = stop_tx.send(());
        self.shared.store.remove_contract_listener(self.gid);
        self.sleeping.store(true, Ordering::SeqCst);
        drop(wake_tx);
        let _ = ack_rx.recv();
        if loop_handle.join().is_err() {
            warn!(gid = %self.gid, "dispatch loop panicked");
        }

        debug!(gid = %self.gid, "stopping all tasks");
        for task in &tasks {
            task.signal_stop();
        }
        for task in tasks {
            task.join();
        }
        *state = SchedulerState::Stopped;
        info!(gid = %self.gid, "contract scheduler stopped");
    }

    /// Force one dispatch pass if the loop is parked; no-op otherwise.
    /// This is what the store's arrival listener calls on new items.
    pub fn wake(&self) {
        if !self.sleeping.load(Ordering::SeqCst) {
            return;
        }
        if let Some(runtime) = self.runtime.lock().as_ref() {
            let _ = runtime.wake_tx.try_send(());
        }
    }

    pub fn status(&self) -> SchedulerState {
        *self.state.lock()
    }

    /// Group this scheduler serves.
    pub fn gid(&self) -> Gid {
        self.gid
    }

    /// Address that initiated this scheduler's registration round.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Pair blacklist, exposed so callers can retire or re-admit pairs.
    pub fn blacklist(&self) -> &PairBlacklist {
        self.shared.blacklist()
    }

    pub fn stats(&self) -> DispatchStats {
        let task_states = self
            .runtime
            .lock()
            .as_ref()
            .map(|runtime| runtime.tasks.iter().map(DispatchTask::state).collect())
            .unwrap_or_default();
        DispatchStats {
            queued_items: self.shared.queued_len(),
            blacklisted_pairs: self.shared.blacklist().len(),
            task_states,
        }
    }
}

impl Drop for ContractScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

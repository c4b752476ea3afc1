//! Worker pool: fixed set of dispatch tasks pulling one item at a time.

use crate::processor::{ContractProcessor, ProcessOutcome};
use crate::scheduler::contract::DispatchShared;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Observable state of one dispatch task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Parked, waiting for a wake signal.
    Idle = 0,
    /// Pulling an item through the dispatch callback.
    Dispatching = 1,
    /// Item handed to the external processor.
    Processing = 2,
}

impl TaskState {
    fn from_u8(value: u8) -> TaskState {
        match value {
            1 => TaskState::Dispatching,
            2 => TaskState::Processing,
            _ => TaskState::Idle,
        }
    }
}

/// Cloneable wake signal for one task, handed to the dispatch loop.
///
/// Capacity-1 channel with non-blocking send: waking a task that is already
/// awake (or already has a pending wake) coalesces into the buffered signal.
#[derive(Clone)]
pub(crate) struct TaskWaker(Sender<()>);

impl TaskWaker {
    pub(crate) fn wake(&self) {
        let _ = self.0.try_send(());
    }
}

/// One executor in the worker pool.
///
/// Once woken, a task keeps requesting items through the scheduler's dispatch
/// callback until it reports "no work", then parks again. Stop is
/// cooperative: a task finishes the item it is processing before honoring the
/// stop signal, and `join` participates in the scheduler's stop barrier.
pub struct DispatchTask {
    index: usize,
    state: Arc<AtomicU8>,
    wake_tx: Sender<()>,
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl DispatchTask {
    pub(crate) fn spawn(
        index: usize,
        shared: Arc<DispatchShared>,
        processor: Arc<dyn ContractProcessor>,
    ) -> DispatchTask {
        let (wake_tx, wake_rx) = bounded::<()>(1);
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let state = Arc::new(AtomicU8::new(TaskState::Idle as u8));
        let task_state = state.clone();
        let handle = thread::Builder::new()
            .name(format!("dispatch-task-{index}"))
            .spawn(move || run_task(index, task_state, wake_rx, stop_rx, shared, processor))
            .expect("failed to spawn dispatch task");
        DispatchTask {
            index,
            state,
            wake_tx,
            stop_tx,
            handle: Some(handle),
        }
    }

    pub(crate) fn waker(&self) -> TaskWaker {
        TaskWaker(self.wake_tx.clone())
    }

    /// Ask the task to exit after its current item; returns immediately.
    pub(crate) fn signal_stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    /// Block until the task thread has returned.
    pub(crate) fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(task = self.index, "dispatch task panicked");
            }
        }
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Relaxed))
    }
}

fn run_task(
    index: usize,
    state: Arc<AtomicU8>,
    wake_rx: Receiver<()>,
    stop_rx: Receiver<()>,
    shared: Arc<DispatchShared>,
    processor: Arc<dyn ContractProcessor>,
) {
    debug!(task = index, "dispatch task running");
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(wake_rx) -> _ => {
                state.store(TaskState::Dispatching as u8, Ordering::Relaxed);
                while let Some(item) = shared.dispatch_one() {
                    state.store(TaskState::Processing as u8, Ordering::Relaxed);
                    debug!(
                        task = index,
                        sender = %item.sender,
                        receiver = %item.receiver,
                        block = %item.source_block,
                        "processing item"
                    );
                    let outcome = processor.process(&item);
                    if outcome == ProcessOutcome::Retire {
                        shared.blacklist().add(item.sender, item.receiver);
                    }
                    state.store(TaskState::Dispatching as u8, Ordering::Relaxed);
                    // Honor a pending stop between items, never mid-item.
                    if stop_rx.try_recv().is_ok() {
                        state.store(TaskState::Idle as u8, Ordering::Relaxed);
                        debug!(task = index, "dispatch task stopped");
                        return;
                    }
                }
                state.store(TaskState::Idle as u8, Ordering::Relaxed);
            }
        }
    }
    state.store(TaskState::Idle as u8, Ordering::Relaxed);
    debug!(task = index, "dispatch task stopped");
}

//! The dedicated worker thread behind an [`Executor`](super::Executor).
//!
//! The worker owns the resource for its whole life. It is either moved in or
//! built in place by an initializer, so resources that must never leave their
//! thread are supported. Jobs arrive over a single-consumer crossbeam channel
//! and run strictly one at a time in arrival order.
//!
//! # Design Principles
//!
//! - **No polling**: the worker blocks on `recv`; callers are woken through
//!   their oneshot result slot
//! - **Drain on shutdown**: dropping the sender does not discard queued jobs,
//!   `recv` keeps yielding them until the queue is empty
//! - **Fault isolation**: every job catches its own panic, so one bad
//!   operation never stops the queue

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, debug_span, error, info, warn};

use super::{ExecutorCounters, ExecutorState};
use crate::core::error::{ExecutorError, ShareError};
use crate::core::pending::ResultSlot;

/// How a job finished, for the statistics counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    Succeeded,
    Failed,
    Panicked,
}

/// A queued operation bound to its result slot.
pub(crate) struct Job<R: 'static> {
    pub(crate) id: u64,
    pub(crate) name: &'static str,
    run: Box<dyn FnOnce(&mut R) -> Completion + Send>,
}

impl<R: 'static> Job<R> {
    /// Bind `op` to `slot`. Whatever `op` does, including panicking, the slot
    /// is filled exactly once.
    pub(crate) fn new<T, E, F>(id: u64, name: &'static str, slot: ResultSlot<T, E>, op: F) -> Self
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce(&mut R) -> Result<T, E> + Send + 'static,
    {
        let run = move |resource: &mut R| match panic::catch_unwind(AssertUnwindSafe(|| op(resource))) {
            Ok(Ok(value)) => {
                slot.fill(Ok(value));
                Completion::Succeeded
            }
            Ok(Err(e)) => {
                slot.fill(Err(ShareError::OperationFailed(e)));
                Completion::Failed
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(error = %message, "Operation panicked");
                slot.fill(Err(ShareError::WorkerFault(message)));
                Completion::Panicked
            }
        };

        Self {
            id,
            name,
            run: Box::new(run),
        }
    }
}

/// Lifecycle state shared between the executor handle and its worker.
///
/// The worker flips the state to `Stopped` on exit and wakes anyone blocked
/// in [`Lifecycle::wait_stopped`]. An abnormal exit is remembered so that
/// every `close` reports it, not just the one that joined the thread.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: Mutex<ExecutorState>,
    changed: Condvar,
    panicked: AtomicBool,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(ExecutorState::Running),
            changed: Condvar::new(),
            panicked: AtomicBool::new(false),
        }
    }

    pub(crate) fn get(&self) -> ExecutorState {
        *self.state.lock()
    }

    /// `Running -> Draining`. Returns false if already past `Running`.
    pub(crate) fn begin_draining(&self) -> bool {
        let mut state = self.state.lock();
        if *state != ExecutorState::Running {
            return false;
        }
        *state = ExecutorState::Draining;
        self.changed.notify_all();
        true
    }

    pub(crate) fn mark_stopped(&self, panicked: bool) {
        if panicked {
            self.panicked.store(true, Ordering::Release);
        }
        let mut state = self.state.lock();
        *state = ExecutorState::Stopped;
        self.changed.notify_all();
    }

    /// Block until `Stopped`, or until `timeout` elapses. Returns whether the
    /// worker has stopped.
    pub(crate) fn wait_stopped(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.state.lock();
        while *state != ExecutorState::Stopped {
            match deadline {
                Some(deadline) => {
                    if self.changed.wait_until(&mut state, deadline).timed_out() {
                        return *state == ExecutorState::Stopped;
                    }
                }
                None => self.changed.wait(&mut state),
            }
        }
        true
    }

    /// Whether the worker thread ended by unwinding.
    pub(crate) fn panicked(&self) -> bool {
        self.panicked.load(Ordering::Acquire)
    }
}

/// Marks the lifecycle stopped when the worker thread ends, even by unwinding.
struct StopGuard(Arc<Lifecycle>);

impl Drop for StopGuard {
    fn drop(&mut self) {
        self.0.mark_stopped(thread::panicking());
    }
}

/// Spawn the worker thread and wait until `init` has produced the resource.
///
/// # Errors
///
/// - `ExecutorError::WorkerSpawn` if the OS refuses the thread
/// - `ExecutorError::InitFailed` if `init` fails or panics; the thread is
///   joined before returning so nothing is leaked
pub(crate) fn spawn_worker<R, I>(
    thread_name: String,
    stack_size: Option<usize>,
    init: I,
    task_rx: Receiver<Job<R>>,
    counters: Arc<ExecutorCounters>,
    lifecycle: Arc<Lifecycle>,
) -> Result<JoinHandle<()>, ExecutorError>
where
    R: 'static,
    I: FnOnce() -> Result<R, String> + Send + 'static,
{
    let (ready_tx, ready_rx) = bounded::<Result<(), String>>(1);

    let mut builder = thread::Builder::new().name(thread_name.clone());
    if let Some(size) = stack_size {
        builder = builder.stack_size(size);
    }

    let handle = builder.spawn(move || {
        let _stop = StopGuard(lifecycle);

        let mut resource = match panic::catch_unwind(AssertUnwindSafe(init)) {
            Ok(Ok(resource)) => resource,
            Ok(Err(reason)) => {
                let _ = ready_tx.send(Err(reason));
                return;
            }
            Err(payload) => {
                let reason = format!("initializer panicked: {}", panic_message(payload.as_ref()));
                let _ = ready_tx.send(Err(reason));
                return;
            }
        };
        let _ = ready_tx.send(Ok(()));

        info!(executor = %thread_name, "Worker started");
        run_jobs(&thread_name, &mut resource, &task_rx, &counters);

        // The resource is torn down on its own thread, before Stopped is published.
        drop(resource);
        info!(
            executor = %thread_name,
            completed = counters.completed.load(Ordering::Relaxed),
            failed = counters.failed.load(Ordering::Relaxed),
            panicked = counters.panicked.load(Ordering::Relaxed),
            "Worker stopped"
        );
    })?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(reason)) => {
            let _ = handle.join();
            error!(error = %reason, "Failed to initialize worker resource");
            Err(ExecutorError::InitFailed(reason))
        }
        Err(_) => {
            let _ = handle.join();
            error!("Worker exited before signalling readiness");
            Err(ExecutorError::InitFailed(
                "worker exited before signalling readiness".into(),
            ))
        }
    }
}

/// The worker loop. Returns once every sender is gone and the queue is empty.
fn run_jobs<R: 'static>(
    executor: &str,
    resource: &mut R,
    task_rx: &Receiver<Job<R>>,
    counters: &ExecutorCounters,
) {
    while let Ok(job) = task_rx.recv() {
        counters.queued.fetch_sub(1, Ordering::Relaxed);

        let span = debug_span!("operation", executor, id = job.id, name = job.name);
        let _entered = span.enter();

        // `Job` catches panics in the operation itself; this also covers the
        // handoff, e.g. an unclaimed result whose `Drop` panics.
        let completion = panic::catch_unwind(AssertUnwindSafe(|| (job.run)(&mut *resource)))
            .unwrap_or_else(|payload| {
                warn!(error = %panic_message(payload.as_ref()), "Panic while delivering operation result");
                Completion::Panicked
            });

        match completion {
            Completion::Succeeded => {
                counters.completed.fetch_add(1, Ordering::Relaxed);
                debug!("Operation completed");
            }
            Completion::Failed => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                debug!("Operation returned an error");
            }
            Completion::Panicked => {
                counters.panicked.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
    debug!(executor, "Task channel closed and drained");
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "operation panicked".to_string())
}

//! Single-worker executor that serializes every operation on one resource.
//!
//! An [`Executor<R>`] owns exactly one dedicated OS thread. The resource of
//! type `R` lives on that thread and is only ever touched by the operation
//! currently running there, so the resource's own code needs no locks.
//! Submissions return immediately with a [`PendingResult`] that the caller
//! awaits (or blocks on) without holding up its own scheduler.
//!
//! # Key Features
//!
//! - **Strict FIFO**: one consumer, one queue, no reordering
//! - **Non-blocking submit**: rejected submissions resolve their handle
//!   immediately instead of erroring at the call site
//! - **Fault isolation**: errors and panics are delivered to the one caller
//!   they belong to; the worker moves on to the next job
//! - **Drain on shutdown**: work queued before shutdown still runs
//!
//! # Example
//!
//! ```
//! use prometheus_sharer::config::ExecutorConfig;
//! use prometheus_sharer::core::Executor;
//!
//! let executor = Executor::new(Vec::<u32>::new(), ExecutorConfig::new())?;
//!
//! let pushed = executor.submit(|items: &mut Vec<u32>| {
//!     items.push(7);
//!     Ok::<_, std::convert::Infallible>(items.len())
//! });
//! assert_eq!(pushed.wait(), Ok(1));
//!
//! executor.close()?;
//! # Ok::<(), prometheus_sharer::core::ExecutorError>(())
//! ```
//!
//! # Reentrancy
//!
//! Every submission crosses into the worker, including submissions made from
//! inside an operation that is already running on it. Such a nested job is
//! simply queued behind the current one: waiting for it from inside the outer
//! operation deadlocks the executor. Nested submissions are logged with a
//! warning.

mod worker;

use std::convert::Infallible;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ExecutorConfig;
use crate::core::error::{ExecutorError, ShareError};
use crate::core::pending::PendingResult;

use worker::{spawn_worker, Job, Lifecycle};

/// Lifecycle of an executor. Moves strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorState {
    /// Accepting submissions; worker active.
    Running,
    /// No new submissions; worker finishing queued operations.
    Draining,
    /// Worker terminated and resource dropped. Terminal.
    Stopped,
}

/// Statistics about executor throughput.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorStats {
    /// Operations accepted into the queue.
    pub submitted: u64,
    /// Operations that returned `Ok`.
    pub completed: u64,
    /// Operations that returned `Err`.
    pub failed: u64,
    /// Operations that panicked.
    pub panicked: u64,
    /// Submissions refused (shut down or queue full).
    pub rejected: u64,
    /// Operations waiting in the queue.
    pub queued: u64,
}

/// Internal counters for executor statistics (lock-free).
#[derive(Debug, Default)]
pub(crate) struct ExecutorCounters {
    pub submitted: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub panicked: AtomicU64,
    pub rejected: AtomicU64,
    pub queued: AtomicU64,
}

impl ExecutorCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> ExecutorStats {
        ExecutorStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
        }
    }
}

/// Serializing executor with one dedicated worker thread.
///
/// `Executor<R>` is `Send + Sync` whatever `R` is: only boxed jobs cross
/// threads, never the resource itself.
///
/// Dropping the executor shuts it down without joining the worker; the worker
/// drains the queue and exits on its own. Use [`Executor::close`] for a
/// deterministic teardown.
pub struct Executor<R: 'static> {
    /// Worker thread name, also used as the `executor` field in logs.
    name: String,

    /// Task sender. `None` once shutdown has begun.
    task_tx: Mutex<Option<Sender<Job<R>>>>,

    /// Bound of the queue, if any.
    capacity: Option<usize>,

    /// Worker handle, taken by the first `close`.
    worker: Mutex<Option<JoinHandle<()>>>,

    /// Identity of the worker thread, for reentrancy detection.
    worker_thread: ThreadId,

    lifecycle: Arc<Lifecycle>,
    counters: Arc<ExecutorCounters>,

    /// Submission sequence numbers.
    next_id: AtomicU64,
}

impl<R: Send + 'static> Executor<R> {
    /// Move `resource` onto a new worker thread and start serving it.
    ///
    /// # Errors
    ///
    /// - `ExecutorError::InvalidConfig` if the configuration is invalid
    /// - `ExecutorError::WorkerSpawn` if the worker thread cannot be started
    pub fn new(resource: R, config: ExecutorConfig) -> Result<Self, ExecutorError> {
        Self::with_init(config, move || Ok::<R, Infallible>(resource))
    }
}

impl<R: 'static> Executor<R> {
    /// Start a worker thread and build the resource on it with `init`.
    ///
    /// The resource never leaves the worker thread, so `R` does not need to
    /// be `Send`. Construction blocks until `init` returns.
    ///
    /// # Errors
    ///
    /// - `ExecutorError::InvalidConfig` if the configuration is invalid
    /// - `ExecutorError::WorkerSpawn` if the worker thread cannot be started
    /// - `ExecutorError::InitFailed` if `init` returns an error or panics
    pub fn with_init<I, E>(config: ExecutorConfig, init: I) -> Result<Self, ExecutorError>
    where
        I: FnOnce() -> Result<R, E> + Send + 'static,
        E: Display,
    {
        config.validate().map_err(ExecutorError::InvalidConfig)?;

        let name = config.thread_name();
        let (task_tx, task_rx) = match config.queue_capacity {
            Some(capacity) => bounded::<Job<R>>(capacity),
            None => unbounded::<Job<R>>(),
        };
        let counters = Arc::new(ExecutorCounters::default());
        let lifecycle = Arc::new(Lifecycle::new());

        let worker = spawn_worker(
            name.clone(),
            config.thread_stack_size,
            move || init().map_err(|e| e.to_string()),
            task_rx,
            Arc::clone(&counters),
            Arc::clone(&lifecycle),
        )?;
        let worker_thread = worker.thread().id();

        info!(
            executor = %name,
            queue_capacity = ?config.queue_capacity,
            "Executor initialized with a dedicated worker thread"
        );

        Ok(Self {
            name,
            task_tx: Mutex::new(Some(task_tx)),
            capacity: config.queue_capacity,
            worker: Mutex::new(Some(worker)),
            worker_thread,
            lifecycle,
            counters,
            next_id: AtomicU64::new(0),
        })
    }

    /// Queue `op` to run on the worker against the resource.
    ///
    /// Returns immediately. The operation's type name is used in logs; see
    /// [`Executor::submit_named`] to choose the name.
    pub fn submit<T, E, F>(&self, op: F) -> PendingResult<T, E>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce(&mut R) -> Result<T, E> + Send + 'static,
    {
        self.submit_named(short_type_name::<F>(), op)
    }

    /// Queue `op` under an explicit operation name.
    ///
    /// If the executor has been shut down, or a bounded queue is full, the
    /// returned handle is already resolved with the corresponding
    /// [`ShareError`] and `op` is dropped without running.
    pub fn submit_named<T, E, F>(&self, name: &'static str, op: F) -> PendingResult<T, E>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce(&mut R) -> Result<T, E> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        if self.is_worker_thread() {
            warn!(
                executor = %self.name,
                id,
                name,
                "Nested submission from the worker thread; waiting on it inside an operation deadlocks"
            );
        }

        // Brief lock: every producer goes through it, so `is_full` below
        // cannot race with another send.
        let task_tx_guard = self.task_tx.lock();
        let Some(task_tx) = task_tx_guard.as_ref() else {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            warn!(executor = %self.name, id, name, "Submission after shutdown rejected");
            return PendingResult::rejected(id, ShareError::ExecutorShutDown);
        };

        if let Some(capacity) = self.capacity {
            if task_tx.is_full() {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(executor = %self.name, id, name, capacity, "Executor queue is full");
                return PendingResult::rejected(id, ShareError::QueueFull { capacity });
            }
        }

        let (slot, pending) = PendingResult::channel(id);
        let job = Job::new(id, name, slot, op);

        self.counters.queued.fetch_add(1, Ordering::Relaxed);
        if task_tx.send(job).is_err() {
            // Worker is gone; the dropped job closes the slot, which the
            // handle reports as a shut-down executor.
            self.counters.queued.fetch_sub(1, Ordering::Relaxed);
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            warn!(executor = %self.name, id, name, "Worker disconnected");
            return pending;
        }
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(executor = %self.name, id, name, "Operation submitted");

        pending
    }

    /// Stop accepting submissions and let the worker drain the queue.
    ///
    /// Does not block. Every operation queued before this call still runs;
    /// every later submission is rejected with
    /// [`ShareError::ExecutorShutDown`]. Calling it again has no effect.
    pub fn shutdown(&self) {
        let mut task_tx = self.task_tx.lock();
        if task_tx.take().is_none() {
            return;
        }
        self.lifecycle.begin_draining();
        info!(
            executor = %self.name,
            queued = self.counters.queued.load(Ordering::Relaxed),
            "Shutdown requested, draining queue"
        );
    }

    /// Shut down and wait for the worker to drain the queue, drop the
    /// resource, and exit.
    ///
    /// Called from the worker thread itself (inside an operation) this only
    /// shuts down, since the worker cannot wait for itself.
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::WorkerPanicked` if the worker thread terminated
    /// abnormally, e.g. because the resource's `Drop` panicked. Every call
    /// after such an exit reports it, whichever caller joined the thread.
    pub fn close(&self) -> Result<(), ExecutorError> {
        self.shutdown();

        if self.is_worker_thread() {
            return Ok(());
        }

        let handle = self.worker.lock().take();
        match handle {
            Some(handle) => {
                handle.join().map_err(|_| ExecutorError::WorkerPanicked)?;
                debug!(executor = %self.name, "Worker joined");
            }
            // Another caller is joining, or already did.
            None => {
                self.lifecycle.wait_stopped(None);
                if self.lifecycle.panicked() {
                    return Err(ExecutorError::WorkerPanicked);
                }
            }
        }
        Ok(())
    }

    /// Block until the worker has stopped, for at most `timeout`.
    ///
    /// Returns `true` if the executor reached [`ExecutorState::Stopped`].
    #[must_use]
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        self.lifecycle.wait_stopped(Some(timeout))
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ExecutorState {
        self.lifecycle.get()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> ExecutorStats {
        self.counters.snapshot()
    }

    /// Worker thread name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the current thread is this executor's worker.
    #[must_use]
    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.worker_thread
    }
}

impl<R: 'static> Drop for Executor<R> {
    fn drop(&mut self) {
        // Signal shutdown but don't join: dropping from async code must not
        // stall the scheduler. The worker drains and exits by itself.
        if self.task_tx.get_mut().is_some() {
            debug!(executor = %self.name, "Executor dropped without explicit close - worker will drain and exit");
        }
        self.shutdown();
    }
}

impl<R: 'static> std::fmt::Debug for Executor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Last path segment of a type name, e.g. `Counter::inc` for a method item.
///
/// Path separators inside generic arguments are skipped, so
/// `Option<alloc::string::String>` stays whole. Closures keep the function
/// they are defined in: `handler::{{closure}}`.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let bytes = full.as_bytes();

    // Byte offsets of the last two top-level `::` separators.
    let (mut last, mut prev) = (None, None);
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                prev = last;
                last = Some(i);
                i += 2;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    let Some(last) = last else {
        return full;
    };
    let owner_start = prev.map_or(0, |p| p + 2);
    let owner = &full[owner_start..last];
    let tail = &full[last + 2..];
    // Keep the method together with its type, and a closure with its function.
    if tail.starts_with("{{") || owner.starts_with(char::is_uppercase) {
        &full[owner_start..]
    } else {
        tail
    }
}

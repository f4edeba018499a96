//! Single-use handoff cell between the worker thread and the caller.
//!
//! The worker writes the outcome exactly once through a [`ResultSlot`]; the
//! caller reads it exactly once through the matching [`PendingResult`], either
//! by awaiting it (async callers) or with [`PendingResult::wait`] (blocking
//! callers). Awaiting parks the task on the channel's waker, so the calling
//! scheduler keeps running other tasks until the worker signals completion.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::error::ShareError;

/// What awaiting a [`PendingResult`] yields.
pub type Outcome<T, E> = Result<T, ShareError<E>>;

/// Producer half of a pending result. Consumed by the single write.
pub(crate) struct ResultSlot<T, E> {
    tx: oneshot::Sender<Outcome<T, E>>,
}

impl<T, E> ResultSlot<T, E> {
    /// Write the outcome and wake the waiter. A caller that already dropped
    /// its handle simply never sees the value.
    pub(crate) fn fill(self, outcome: Outcome<T, E>) {
        let _ = self.tx.send(outcome);
    }
}

/// Handle to the eventual outcome of a submitted operation.
///
/// Resolves to `Ok(T)` when the operation succeeds, or to a [`ShareError`]
/// carrying the operation's own error, a worker fault, or a rejection.
///
/// Dropping the handle does not cancel the operation; it still runs on the
/// worker and its result is discarded.
#[must_use = "the operation runs regardless; dropping the handle discards its result"]
#[derive(Debug)]
pub struct PendingResult<T, E> {
    id: u64,
    rx: oneshot::Receiver<Outcome<T, E>>,
}

impl<T, E> PendingResult<T, E> {
    /// Create an unresolved handle together with its producer slot.
    pub(crate) fn channel(id: u64) -> (ResultSlot<T, E>, Self) {
        let (tx, rx) = oneshot::channel();
        (ResultSlot { tx }, Self { id, rx })
    }

    /// Create a handle that is already resolved with `error`.
    pub(crate) fn rejected(id: u64, error: ShareError<E>) -> Self {
        let (slot, pending) = Self::channel(id);
        slot.fill(Err(error));
        pending
    }

    /// Submission sequence number of the operation behind this handle.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Block the current thread until the outcome is available.
    ///
    /// Intended for synchronous callers. Async callers should `.await` the
    /// handle instead.
    ///
    /// # Errors
    ///
    /// Returns the operation's [`ShareError`] on failure or rejection.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context,
    /// where blocking would stall the scheduler.
    pub fn wait(self) -> Outcome<T, E> {
        self.rx.blocking_recv().unwrap_or(Err(ShareError::ExecutorShutDown))
    }

    /// Await the outcome for at most `duration`.
    ///
    /// Timing out only abandons the wait: the operation has already been
    /// queued and will still run against the resource.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::TimedOut`] if the deadline passes first, or the
    /// operation's own [`ShareError`].
    #[cfg(feature = "tokio-runtime")]
    pub async fn timeout(self, duration: std::time::Duration) -> Outcome<T, E> {
        tokio::time::timeout(duration, self)
            .await
            .unwrap_or(Err(ShareError::TimedOut(duration)))
    }
}

impl<T, E> Future for PendingResult<T, E> {
    type Output = Outcome<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A closed slot means the job was dropped unexecuted with the worker.
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ShareError::ExecutorShutDown)))
    }
}

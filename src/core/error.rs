//! Error types for executor lifecycle and shared operations.

use std::time::Duration;

use thiserror::Error;

/// Errors produced while building, configuring, or tearing down an executor.
///
/// Construction failures are fatal: no half-initialized executor is ever
/// returned to the caller.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The operating system refused to start the worker thread.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
    /// The resource initializer failed or panicked on the worker thread.
    #[error("resource initialization failed: {0}")]
    InitFailed(String),
    /// The worker thread terminated abnormally.
    #[error("worker thread panicked")]
    WorkerPanicked,
}

/// Outcome error of a shared operation, delivered where the caller awaits its
/// [`PendingResult`](crate::core::PendingResult).
///
/// `E` is the error type of the wrapped operation itself and is carried back
/// unchanged in [`ShareError::OperationFailed`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareError<E> {
    /// The operation ran and returned an error.
    #[error("operation failed: {0}")]
    OperationFailed(E),
    /// The executor was shut down before the operation could run.
    #[error("executor has been shut down")]
    ExecutorShutDown,
    /// The operation panicked on the worker thread.
    #[error("worker fault: {0}")]
    WorkerFault(String),
    /// The bounded submission queue was full.
    #[error("queue full (capacity {capacity})")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },
    /// The caller stopped waiting. The operation itself still runs.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

impl<E> ShareError<E> {
    /// Whether the operation was rejected because the executor is shut down.
    #[must_use]
    pub const fn is_shut_down(&self) -> bool {
        matches!(self, Self::ExecutorShutDown)
    }

    /// Whether the operation ran and produced an error (returned or panicked).
    #[must_use]
    pub const fn is_operation_failure(&self) -> bool {
        matches!(self, Self::OperationFailed(_) | Self::WorkerFault(_))
    }

    /// Extract the operation's own error, if that is what this is.
    pub fn operation_error(self) -> Option<E> {
        match self {
            Self::OperationFailed(e) => Some(e),
            _ => None,
        }
    }

    /// Convert the operation error type, leaving every other variant intact.
    pub fn map_operation<F>(self, f: impl FnOnce(E) -> F) -> ShareError<F> {
        match self {
            Self::OperationFailed(e) => ShareError::OperationFailed(f(e)),
            Self::ExecutorShutDown => ShareError::ExecutorShutDown,
            Self::WorkerFault(msg) => ShareError::WorkerFault(msg),
            Self::QueueFull { capacity } => ShareError::QueueFull { capacity },
            Self::TimedOut(d) => ShareError::TimedOut(d),
        }
    }
}

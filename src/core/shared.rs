//! The contract a resource handle implements to own an executor.

use std::sync::Arc;

use super::error::ExecutorError;
use super::executor::{Executor, ExecutorState};

/// A handle that owns the [`Executor`] serializing access to its resource.
///
/// This is the only capability the wrapping functions in
/// [`share`](crate::core::share) and the [`shared_methods!`](crate::shared_methods)
/// macro need. The executor is created when the handle is constructed and is
/// never shared with another handle.
///
/// # Example
///
/// ```
/// use prometheus_sharer::config::ExecutorConfig;
/// use prometheus_sharer::core::{Executor, ExecutorError, Shared};
///
/// struct Connection { queries: u64 }
///
/// struct Database { executor: Executor<Connection> }
///
/// impl Shared for Database {
///     type Resource = Connection;
///
///     fn executor(&self) -> &Executor<Connection> {
///         &self.executor
///     }
/// }
///
/// let db = Database {
///     executor: Executor::new(Connection { queries: 0 }, ExecutorConfig::new())?,
/// };
/// db.close()?;
/// # Ok::<(), ExecutorError>(())
/// ```
pub trait Shared {
    /// The state living on the worker thread.
    type Resource: 'static;

    /// The executor owned by this handle.
    fn executor(&self) -> &Executor<Self::Resource>;

    /// Teardown hook: stop accepting work, drain the queue, and release the
    /// worker thread. Call once before discarding the handle; dropping the
    /// handle without it still shuts down, but without waiting.
    ///
    /// # Errors
    ///
    /// See [`Executor::close`].
    fn close(&self) -> Result<(), ExecutorError> {
        self.executor().close()
    }

    /// Lifecycle state of the owned executor.
    fn state(&self) -> ExecutorState {
        self.executor().state()
    }
}

impl<R: 'static> Shared for Executor<R> {
    type Resource = R;

    fn executor(&self) -> &Self {
        self
    }
}

impl<S: Shared + ?Sized> Shared for Arc<S> {
    type Resource = S::Resource;

    fn executor(&self) -> &Executor<S::Resource> {
        (**self).executor()
    }
}

impl<S: Shared + ?Sized> Shared for &S {
    type Resource = S::Resource;

    fn executor(&self) -> &Executor<S::Resource> {
        (**self).executor()
    }
}

//! Operation wrappers: route a call on a [`Shared`] handle through its executor.
//!
//! Each function builds one operation from a method (or closure) and its
//! arguments, submits it, and hands back the [`PendingResult`]. Awaiting the
//! result is the single suspension point of the call; it yields exactly what
//! the method returned, with the method's own error wrapped in
//! [`ShareError::OperationFailed`](crate::core::ShareError::OperationFailed).
//!
//! For declaring many wrapped methods at once, see
//! [`shared_methods!`](crate::shared_methods).

use std::convert::Infallible;

use super::executor::short_type_name;
use super::pending::PendingResult;
use super::shared::Shared;

/// Names the success and error types of a `Result`.
///
/// Lets [`shared_methods!`](crate::shared_methods) spell the return type of a
/// wrapped method from the resource method's return type.
pub trait SplitResult {
    /// Success type.
    type Ok;
    /// Error type.
    type Err;
}

impl<T, E> SplitResult for Result<T, E> {
    type Ok = T;
    type Err = E;
}

/// Run `method(resource, args)` on the resource's worker.
///
/// `method` is usually a method item such as `Connection::query`; its path is
/// used as the operation name in logs. Methods taking several arguments can
/// take them as a tuple, or be wrapped with [`share_with`].
///
/// ```
/// use prometheus_sharer::config::ExecutorConfig;
/// use prometheus_sharer::core::{share, Executor};
///
/// struct Store { rows: Vec<String> }
///
/// impl Store {
///     fn insert(&mut self, row: String) -> Result<usize, String> {
///         if row.is_empty() {
///             return Err("empty row".into());
///         }
///         self.rows.push(row);
///         Ok(self.rows.len())
///     }
/// }
///
/// let store = Executor::new(Store { rows: Vec::new() }, ExecutorConfig::new())?;
/// assert_eq!(share(&store, Store::insert, "alpha".to_string()).wait(), Ok(1));
/// assert!(share(&store, Store::insert, String::new()).wait().is_err());
/// # Ok::<(), prometheus_sharer::core::ExecutorError>(())
/// ```
pub fn share<S, M, A, T, E>(resource: &S, method: M, args: A) -> PendingResult<T, E>
where
    S: Shared + ?Sized,
    M: FnOnce(&mut S::Resource, A) -> Result<T, E> + Send + 'static,
    A: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    resource
        .executor()
        .submit_named(short_type_name::<M>(), move |r| method(r, args))
}

/// Run the closure `op` on the resource's worker.
pub fn share_with<S, F, T, E>(resource: &S, op: F) -> PendingResult<T, E>
where
    S: Shared + ?Sized,
    F: FnOnce(&mut S::Resource) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    resource.executor().submit(op)
}

/// Run `op` under an explicit operation name.
pub fn share_named<S, F, T, E>(resource: &S, name: &'static str, op: F) -> PendingResult<T, E>
where
    S: Shared + ?Sized,
    F: FnOnce(&mut S::Resource) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    resource.executor().submit_named(name, op)
}

/// Run an infallible closure on the resource's worker.
///
/// The handle can still resolve to an error if the executor is shut down or
/// the closure panics.
pub fn call<S, F, T>(resource: &S, op: F) -> PendingResult<T, Infallible>
where
    S: Shared + ?Sized,
    F: FnOnce(&mut S::Resource) -> T + Send + 'static,
    T: Send + 'static,
{
    resource
        .executor()
        .submit_named(short_type_name::<F>(), move |r| Ok(op(r)))
}

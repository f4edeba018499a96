//! Declarative wrapping of resource methods.

/// Declare wrapped methods on a [`Shared`](crate::core::Shared) handle.
///
/// For every listed resource method, generates a method of the same name on
/// the handle that takes `&self` plus the method's arguments and returns a
/// [`PendingResult`](crate::core::PendingResult) for the method's
/// `Result<T, E>`. Calling it submits the method to the handle's executor;
/// awaiting the result is the call's only suspension point.
///
/// Listed methods must take `&mut self` and return a `Result`. Arguments are
/// moved to the worker thread, so they must be owned (`Send + 'static`).
///
/// ```
/// use std::convert::Infallible;
/// use prometheus_sharer::config::ExecutorConfig;
/// use prometheus_sharer::core::{Executor, Shared};
/// use prometheus_sharer::shared_methods;
///
/// pub struct Counter { value: u64 }
///
/// impl Counter {
///     fn inc(&mut self) -> Result<u64, Infallible> {
///         self.value += 1;
///         Ok(self.value)
///     }
///
///     fn add(&mut self, by: u64) -> Result<u64, String> {
///         self.value = self.value.checked_add(by).ok_or("overflow")?;
///         Ok(self.value)
///     }
/// }
///
/// pub struct SharedCounter { executor: Executor<Counter> }
///
/// impl Shared for SharedCounter {
///     type Resource = Counter;
///     fn executor(&self) -> &Executor<Counter> { &self.executor }
/// }
///
/// shared_methods! {
///     impl SharedCounter => Counter {
///         /// Increment by one.
///         pub fn inc(&mut self) -> Result<u64, Infallible>;
///         /// Increment by `by`.
///         pub fn add(&mut self, by: u64) -> Result<u64, String>;
///     }
/// }
///
/// let counter = SharedCounter {
///     executor: Executor::new(Counter { value: 0 }, ExecutorConfig::new())?,
/// };
/// assert_eq!(counter.inc().wait(), Ok(1));
/// assert_eq!(counter.add(41).wait(), Ok(42));
/// # Ok::<(), prometheus_sharer::core::ExecutorError>(())
/// ```
#[macro_export]
macro_rules! shared_methods {
    (
        impl $handle:ty => $resource:ty {
            $(
                $(#[$meta:meta])*
                $vis:vis fn $name:ident(&mut self $(, $arg:ident: $arg_ty:ty)*) -> $ret:ty;
            )*
        }
    ) => {
        impl $handle {
            $(
                $(#[$meta])*
                $vis fn $name(
                    &self
                    $(, $arg: $arg_ty)*
                ) -> $crate::core::PendingResult<
                    <$ret as $crate::core::SplitResult>::Ok,
                    <$ret as $crate::core::SplitResult>::Err,
                > {
                    $crate::core::share_named(
                        self,
                        concat!(stringify!($resource), "::", stringify!($name)),
                        move |resource: &mut $resource| -> $ret { <$resource>::$name(resource $(, $arg)*) },
                    )
                }
            )*
        }
    };
}

//! Integration tests for shared resource handles
//!
//! These tests drive resources through handles generated with
//! `shared_methods!` from async callers:
//! - Wrapped methods return exactly what the resource method returns
//! - Concurrent callers never lose updates
//! - Awaiting a result never blocks the caller's scheduler
//! - Teardown through the `Shared` contract

use prometheus_sharer::config::ExecutorConfig;
use prometheus_sharer::core::{call, share, Executor, ExecutorState, PendingResult, ShareError, Shared};
use prometheus_sharer::shared_methods;
use std::convert::Infallible;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// TEST RESOURCES
// ============================================================================

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
struct Warning(String);

/// Plain resource with a computation, a multi-argument check, and a failure.
struct Sample;

impl Sample {
    fn computation(&mut self) -> Result<f64, Warning> {
        Ok(100.0 * 100.0 / 2.0)
    }

    fn arguments(
        &mut self,
        one: i32,
        two: i32,
        three: Option<i32>,
        four: Option<i32>,
    ) -> Result<bool, Warning> {
        Ok(one == 1 && two == 2 && three == Some(3) && four == Some(4))
    }

    fn crash(&mut self) -> Result<(), Warning> {
        Err(Warning("Can you read this exception?".to_string()))
    }
}

struct SharedSample {
    executor: Executor<Sample>,
}

impl SharedSample {
    fn new() -> Self {
        Self {
            executor: Executor::new(Sample, ExecutorConfig::new().with_name("sample")).unwrap(),
        }
    }
}

impl Shared for SharedSample {
    type Resource = Sample;

    fn executor(&self) -> &Executor<Sample> {
        &self.executor
    }
}

shared_methods! {
    impl SharedSample => Sample {
        fn computation(&mut self) -> Result<f64, Warning>;
        fn arguments(&mut self, one: i32, two: i32, three: Option<i32>, four: Option<i32>) -> Result<bool, Warning>;
        fn crash(&mut self) -> Result<(), Warning>;
    }
}

/// Counter whose increment is a read-modify-write that would lose updates
/// under unsynchronized access.
#[derive(Default)]
struct Counter {
    value: u64,
}

impl Counter {
    fn inc(&mut self) -> Result<u64, Infallible> {
        let read = self.value;
        std::thread::yield_now();
        self.value = read + 1;
        Ok(self.value)
    }

    fn get(&mut self) -> Result<u64, Infallible> {
        Ok(self.value)
    }

    fn reset(&mut self, to: u64) -> Result<u64, Infallible> {
        Ok(std::mem::replace(&mut self.value, to))
    }
}

struct SharedCounter {
    executor: Executor<Counter>,
}

impl SharedCounter {
    fn new() -> Self {
        Self {
            executor: Executor::new(Counter::default(), ExecutorConfig::new()).unwrap(),
        }
    }
}

impl Shared for SharedCounter {
    type Resource = Counter;

    fn executor(&self) -> &Executor<Counter> {
        &self.executor
    }
}

shared_methods! {
    impl SharedCounter => Counter {
        fn inc(&mut self) -> Result<u64, Infallible>;
        fn get(&mut self) -> Result<u64, Infallible>;
        fn reset(&mut self, to: u64) -> Result<u64, Infallible>;
    }
}

// ============================================================================
// WRAPPED METHODS
// ============================================================================

#[tokio::test]
async fn test_computation() {
    let resource = SharedSample::new();
    assert_eq!(resource.computation().await, Ok(5000.0));
    resource.close().unwrap();
}

#[tokio::test]
async fn test_arguments() {
    let resource = SharedSample::new();
    assert_eq!(resource.arguments(1, 2, Some(3), Some(4)).await, Ok(true));
    assert_eq!(resource.arguments(1, 2, None, None).await, Ok(false));
    assert_eq!(resource.arguments(2, 1, Some(3), Some(4)).await, Ok(false));
    resource.close().unwrap();
}

#[tokio::test]
async fn test_crash_is_reported_to_caller() {
    let resource = SharedSample::new();

    for _ in 0..10 {
        assert_eq!(resource.computation().await, Ok(5000.0));
        assert_eq!(resource.arguments(1, 2, Some(3), Some(4)).await, Ok(true));
        let err = resource.crash().await.unwrap_err();
        assert_eq!(err, ShareError::OperationFailed(Warning("Can you read this exception?".to_string())));
        assert_eq!(err.to_string(), "operation failed: Can you read this exception?");
    }

    assert_eq!(resource.state(), ExecutorState::Running);
    assert_eq!(resource.executor().stats().failed, 10);
}

#[tokio::test]
async fn test_wrapped_calls_after_close_are_rejected() {
    let resource = SharedSample::new();
    resource.close().unwrap();
    assert_eq!(resource.state(), ExecutorState::Stopped);
    assert_eq!(resource.computation().await, Err(ShareError::ExecutorShutDown));
}

// ============================================================================
// CONCURRENT CALLERS
// ============================================================================

#[tokio::test]
async fn test_concurrent_increments_are_not_lost() {
    let counter = SharedCounter::new();

    let results = futures::future::join_all((0..100).map(|_| counter.inc())).await;
    let mut values: Vec<u64> = results.into_iter().map(Result::unwrap).collect();
    values.sort_unstable();

    assert_eq!(values, (1..=100).collect::<Vec<_>>());
    assert_eq!(counter.get().await, Ok(100));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_from_spawned_tasks() {
    let counter = Arc::new(SharedCounter::new());

    let tasks: Vec<_> = (0..100)
        .map(|_| {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move { counter.inc().await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    assert_eq!(counter.get().await, Ok(100));
    assert_eq!(counter.reset(0).await, Ok(100));
    assert_eq!(call(&counter, |c: &mut Counter| c.value).await, Ok(0));
    counter.close().unwrap();
}

#[tokio::test]
async fn test_share_function_on_handle() {
    let counter = SharedCounter::new();
    assert_eq!(share(&counter, Counter::reset, 41).await, Ok(0));
    assert_eq!(counter.inc().await, Ok(42));
}

// ============================================================================
// SCHEDULER LIVENESS
// ============================================================================

#[tokio::test]
async fn test_awaiting_does_not_block_the_scheduler() {
    let counter = SharedCounter::new();
    let (signal_tx, signal_rx) = mpsc::channel::<()>();

    // The operation only finishes once another task on this single-threaded
    // runtime has run, so it deadlocks if awaiting blocks the thread.
    let waiting = counter.executor().submit(move |c: &mut Counter| {
        let signalled = signal_rx.recv_timeout(Duration::from_secs(5)).is_ok();
        c.value += 1;
        Ok::<_, Infallible>(signalled)
    });
    let signaller = async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        signal_tx.send(()).unwrap();
    };

    let (signalled, ()) = tokio::join!(waiting, signaller);
    assert_eq!(signalled, Ok(true));
}

#[tokio::test]
async fn test_timeout_abandons_wait_but_not_operation() {
    let counter = SharedCounter::new();

    let slow: PendingResult<u64, Infallible> = counter.executor().submit(|c: &mut Counter| {
        std::thread::sleep(Duration::from_millis(100));
        c.inc()
    });
    let timed_out = slow.timeout(Duration::from_millis(5)).await;
    assert_eq!(timed_out, Err(ShareError::TimedOut(Duration::from_millis(5))));

    // FIFO: this runs after the abandoned operation completed.
    assert_eq!(counter.get().await, Ok(1));
}

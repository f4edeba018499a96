//! Share a single-threaded resource between async tasks.
//!
//! Run with `RUST_LOG=prometheus_sharer=debug cargo run --example shared` to
//! see every operation pass through the worker.

use std::process::ExitCode;

use prometheus_sharer::config::ExecutorConfig;
use prometheus_sharer::core::{Executor, ExecutorError, ShareError, Shared};
use prometheus_sharer::shared_methods;
use prometheus_sharer::util::init_tracing;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Warning(&'static str);

/// Resource to be shared.
struct Resource;

impl Resource {
    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    fn computation(&mut self) -> Result<f64, Warning> {
        Ok(100.0 * 100.0 / 2.0)
    }

    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    fn arguments(
        &mut self,
        one: i32,
        two: i32,
        three: Option<i32>,
        four: Option<i32>,
    ) -> Result<bool, Warning> {
        Ok(one == 1 && two == 2 && three == Some(3) && four == Some(4))
    }

    #[allow(clippy::unused_self)]
    fn crash(&mut self) -> Result<(), Warning> {
        Err(Warning("Can you read this exception?"))
    }
}

struct SharedResource {
    executor: Executor<Resource>,
}

impl Shared for SharedResource {
    type Resource = Resource;

    fn executor(&self) -> &Executor<Resource> {
        &self.executor
    }
}

shared_methods! {
    impl SharedResource => Resource {
        fn computation(&mut self) -> Result<f64, Warning>;
        fn arguments(&mut self, one: i32, two: i32, three: Option<i32>, four: Option<i32>) -> Result<bool, Warning>;
        fn crash(&mut self) -> Result<(), Warning>;
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, ExecutorError> {
    init_tracing();

    let config = ExecutorConfig::from_env().map_err(ExecutorError::InvalidConfig)?;
    let resource = SharedResource {
        executor: Executor::new(Resource, config)?,
    };

    for _ in 0..10 {
        match resource.computation().await {
            Ok(value) => println!("{value}"),
            Err(e) => println!("computation failed: {e}"),
        }
        match resource.arguments(1, 2, Some(3), Some(4)).await {
            Ok(matched) => println!("{matched}"),
            Err(e) => println!("arguments failed: {e}"),
        }
        match resource.crash().await {
            Err(ShareError::OperationFailed(warning)) => println!("caught: {warning}"),
            other => {
                eprintln!("resource should report its failure, got {other:?}");
                resource.close()?;
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    println!("{:?}", resource.executor().stats());
    resource.close()?;
    Ok(ExitCode::SUCCESS)
}

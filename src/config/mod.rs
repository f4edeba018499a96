//! Configuration models for executors.

pub mod executor;

pub use executor::{ExecutorConfig, ENV_QUEUE_CAPACITY, ENV_STACK_SIZE, ENV_THREAD_NAME, MIN_STACK_SIZE};

//! # Prometheus Sharer
//!
//! Serialized, non-blocking access to a resource that is not thread-safe.
//!
//! Some resources (a database connection, a device handle, a parser with
//! internal buffers) must never be touched by two threads at once. This
//! library gives each such resource its own [`Executor`](core::Executor): a
//! dedicated worker thread that owns the resource and runs every operation on
//! it strictly one at a time, in submission order. Callers submit operations
//! and get back a [`PendingResult`](core::PendingResult) they can `.await`
//! from any async runtime, or block on from plain threads.
//!
//! ## Key Features
//!
//! - **Serialization**: at most one operation touches the resource at a time
//! - **FIFO ordering**: operations run in the order they were accepted
//! - **Non-blocking callers**: awaiting a result suspends only the caller
//! - **Fault isolation**: a failing or panicking operation is reported to its
//!   own caller and the worker keeps serving the queue
//! - **Drain on shutdown**: everything accepted before shutdown still runs
//!
//! ## Sharing a resource
//!
//! A handle type owns an executor and implements [`Shared`](core::Shared).
//! The [`shared_methods!`] macro then generates one wrapped method per
//! resource method:
//!
//! ```
//! use std::convert::Infallible;
//! use prometheus_sharer::config::ExecutorConfig;
//! use prometheus_sharer::core::{Executor, Shared};
//! use prometheus_sharer::shared_methods;
//!
//! pub struct Connection { statements: Vec<String> }
//!
//! impl Connection {
//!     fn execute(&mut self, sql: String) -> Result<usize, String> {
//!         if sql.is_empty() {
//!             return Err("empty statement".into());
//!         }
//!         self.statements.push(sql);
//!         Ok(self.statements.len())
//!     }
//!
//!     fn count(&mut self) -> Result<usize, Infallible> {
//!         Ok(self.statements.len())
//!     }
//! }
//!
//! pub struct Database { executor: Executor<Connection> }
//!
//! impl Shared for Database {
//!     type Resource = Connection;
//!     fn executor(&self) -> &Executor<Connection> { &self.executor }
//! }
//!
//! shared_methods! {
//!     impl Database => Connection {
//!         pub fn execute(&mut self, sql: String) -> Result<usize, String>;
//!         pub fn count(&mut self) -> Result<usize, Infallible>;
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let db = Database {
//!     executor: Executor::new(Connection { statements: Vec::new() }, ExecutorConfig::new())?,
//! };
//!
//! assert_eq!(db.execute("insert".into()).await, Ok(1));
//! assert!(db.execute(String::new()).await.is_err());
//! assert_eq!(db.count().await, Ok(1));
//!
//! db.close()?;
//! # Ok::<(), prometheus_sharer::core::ExecutorError>(())
//! # }).unwrap();
//! ```
//!
//! One-off operations can be submitted without a macro through
//! [`share`](core::share), [`share_with`](core::share_with) and
//! [`call`](core::call).
//!
//! ## Limitations
//!
//! - **No cancellation**: dropping a [`PendingResult`](core::PendingResult), or
//!   giving up with [`PendingResult::timeout`](core::PendingResult::timeout),
//!   abandons the wait but not the operation. It still runs.
//! - **No reentrancy**: an operation that submits to its own executor and waits
//!   for the result deadlocks the worker. Such submissions are logged.
//! - **Drop does not join**: dropping an executor shuts it down and lets the
//!   worker drain in the background. Call `close` to wait for it.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Serializing executor, result handles, and the shared-resource contract.
pub mod core;
/// Configuration models for executors.
pub mod config;
/// Shared utilities.
pub mod util;

mod macros;

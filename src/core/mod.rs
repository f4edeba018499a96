//! Serializing executor, result handles, and the shared-resource contract.

pub mod error;
pub mod executor;
pub mod pending;
pub mod share;
pub mod shared;

pub use error::{ExecutorError, ShareError};
pub use executor::{Executor, ExecutorState, ExecutorStats};
pub use pending::{Outcome, PendingResult};
pub use share::{call, share, share_named, share_with, SplitResult};
pub use shared::Shared;

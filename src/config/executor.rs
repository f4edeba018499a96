//! Executor configuration.

use std::env;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest worker stack accepted by [`ExecutorConfig::validate`].
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// Environment variable naming the worker thread.
pub const ENV_THREAD_NAME: &str = "SHARER_THREAD_NAME";
/// Environment variable bounding the queue.
pub const ENV_QUEUE_CAPACITY: &str = "SHARER_QUEUE_CAPACITY";
/// Environment variable setting the worker stack size in bytes.
pub const ENV_STACK_SIZE: &str = "SHARER_STACK_SIZE";

/// Configuration for one [`Executor`](crate::core::Executor).
///
/// Every field is optional; the default is an unbounded queue served by a
/// worker thread with a generated name and the platform's default stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Worker thread name. Generated as `sharer-<8 hex digits>` when unset.
    pub name: Option<String>,
    /// Maximum queued operations. `None` means unbounded.
    pub queue_capacity: Option<usize>,
    /// Worker thread stack size in bytes.
    pub thread_stack_size: Option<usize>,
}

impl ExecutorConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker thread name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Bound the queue to `capacity` pending operations.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Set the worker thread stack size in bytes.
    #[must_use]
    pub fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("name must not be empty".into());
            }
            if name.contains('\0') {
                return Err("name must not contain NUL bytes".into());
            }
        }
        if self.queue_capacity == Some(0) {
            return Err("queue_capacity must be greater than 0".into());
        }
        if let Some(size) = self.thread_stack_size {
            if size < MIN_STACK_SIZE {
                return Err(format!("thread_stack_size must be at least {MIN_STACK_SIZE} bytes"));
            }
        }
        Ok(())
    }

    /// The worker thread name, generating one if none is configured.
    #[must_use]
    pub fn thread_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            let id = Uuid::new_v4().simple().to_string();
            format!("sharer-{}", &id[..8])
        })
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read configuration from the environment, after loading a `.env` file
    /// if one is present.
    ///
    /// Reads [`ENV_THREAD_NAME`], [`ENV_QUEUE_CAPACITY`] and
    /// [`ENV_STACK_SIZE`]. Unset variables keep their defaults. This is an
    /// application-level helper: executors never read the environment on
    /// their own.
    ///
    /// # Errors
    ///
    /// Returns a description of an unparsable value or a validation failure.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();

        let cfg = Self {
            name: env::var(ENV_THREAD_NAME).ok(),
            queue_capacity: parse_env(ENV_QUEUE_CAPACITY)?,
            thread_stack_size: parse_env(ENV_STACK_SIZE)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_env(key: &str) -> Result<Option<usize>, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| format!("{key}: {e}")),
        Err(_) => Ok(None),
    }
}

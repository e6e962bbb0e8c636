//! Execution Options
//!
//! Options for a single `execute` call. They can be built in code or loaded
//! from a YAML file; every field has a default.
//!
//! ```yaml
//! max_workers: 4
//! chunk_size: 16
//! cleanup: true
//! cleanup_policy: warn
//! ```

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::error::ExecutionError;

/// What happens when the cleanup hook fails for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPolicy {
    /// Log the failure and keep going; results are unaffected
    #[default]
    Warn,
    /// Treat the failure like an alignment failure and abort the call
    Abort,
}

/// Options controlling worker count, chunking and cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionOptions {
    /// Number of concurrent workers; 1 selects the sequential path
    pub max_workers: usize,

    /// Units per dispatched chunk
    pub chunk_size: usize,

    /// Whether `cleanup` runs after each unit's `align`
    pub cleanup: bool,

    /// How cleanup failures are handled
    pub cleanup_policy: CleanupPolicy,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_workers: 1,
            chunk_size: 1,
            cleanup: true,
            cleanup_policy: CleanupPolicy::Warn,
        }
    }
}

impl ExecutionOptions {
    /// Creates options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of workers.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Sets the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Enables or disables the cleanup hook.
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Sets the cleanup failure policy.
    pub fn with_cleanup_policy(mut self, policy: CleanupPolicy) -> Self {
        self.cleanup_policy = policy;
        self
    }

    /// Sets the worker count to the number of logical CPUs.
    pub fn with_all_cpus(self) -> Self {
        self.with_max_workers(available_workers())
    }

    /// Returns true when the call runs without a worker pool.
    pub fn is_sequential(&self) -> bool {
        self.max_workers == 1
    }

    /// Checks that every option is in range.
    pub fn validate(&self) -> Result<(), ExecutionError> {
        if self.max_workers < 1 {
            return Err(ExecutionError::InvalidConfiguration(format!(
                "max_workers must be at least 1, got {}",
                self.max_workers
            )));
        }

        if self.chunk_size < 1 {
            return Err(ExecutionError::InvalidConfiguration(format!(
                "chunk_size must be at least 1, got {}",
                self.chunk_size
            )));
        }

        Ok(())
    }

    /// Loads and validates options from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ExecutionError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        info!("Loading execution options from: {}", display);

        let content = fs::read_to_string(path).map_err(|source| ExecutionError::Io {
            path: display.clone(),
            source,
        })?;

        Self::from_yaml(&content, &display)
    }

    /// Parses and validates options from YAML text.
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self, ExecutionError> {
        // An empty document means "all defaults".
        let options: ExecutionOptions = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ExecutionError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            })?
        };

        options.validate()?;
        debug!("Execution options: {:?}", options);

        Ok(options)
    }
}

/// Number of logical CPUs available to the process.
pub fn available_workers() -> usize {
    num_cpus::get().max(1)
}

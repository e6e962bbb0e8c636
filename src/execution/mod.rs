//! Chunked Execution Module
//!
//! Provides the engine that runs an aligner over a workload, either on the
//! calling thread or on a per-call pool of worker threads, and reassembles
//! the records in workload order.
//!
//! # Architecture
//!
//! - [`engine`]: Entry point; validation and path selection
//! - [`options`]: Worker count, chunk size and cleanup settings
//! - [`processor`]: Per-unit align/cleanup logic shared by both paths
//! - [`pool`]: Scoped worker threads fed from a shared chunk queue
//! - [`gather`]: Ordered reassembly of out-of-order chunk results
//! - [`sequential`]: Single-worker path without pool machinery
//! - [`error`]: Error types

pub mod engine;
pub mod error;
pub mod gather;
pub mod options;
pub mod pool;
pub mod processor;
pub mod sequential;

pub use engine::{Engine, Execution};
pub use error::{ExecutionError, UnitError};
pub use gather::ResultGatherer;
pub use options::{available_workers, CleanupPolicy, ExecutionOptions};
pub use pool::WorkerPool;
pub use processor::{ChunkResult, UnitProcessor, UnitStats};
pub use sequential::execute_sequential;

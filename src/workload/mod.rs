//! Workload Module
//!
//! Everything the engine needs to know about a workload: how to split it into
//! chunks and how to read one from disk. Units themselves stay opaque.
//!
//! - [`chunk`]: Contiguous, indexed partitioning
//! - [`loader`]: YAML/JSON workload files

pub mod chunk;
pub mod loader;

pub use chunk::{chunk_count, partition, Chunk};
pub use loader::{load_workload, parse_workload};

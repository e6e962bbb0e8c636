//! ChunkRunner - Chunked Parallel Execution Engine
//!
//! Runs a host-supplied aligner over an ordered workload of opaque units,
//! groups units into chunks to amortize dispatch, spreads the chunks over a
//! per-call pool of worker threads and hands back every record in workload
//! order, no matter which worker finished first.
//!
//! # Architecture
//!
//! The library is organized into four main modules:
//!
//! - [`capability`]: The `align`/`cleanup` contract hosts implement
//! - [`workload`]: Chunk partitioning and workload files
//! - [`execution`]: Engine, worker pool, gatherer and sequential path
//! - [`monitoring`]: Per-call timeline and execution report
//!
//! # Example
//!
//! ```rust
//! use chunkrunner::{Engine, ExecutionOptions, FnAligner};
//!
//! let engine = Engine::new(FnAligner::new(
//!     |read: &String| Ok(vec![(read.clone(), read.len())]),
//!     |_records: &[(String, usize)]| Ok(()),
//! ));
//!
//! let workload = vec!["ACGT".to_string(), "GG".to_string()];
//! let options = ExecutionOptions::new().with_max_workers(2);
//!
//! let records = engine.execute(&workload, &options).unwrap();
//! assert_eq!(records[1], ("GG".to_string(), 2));
//! ```

pub mod capability;
pub mod execution;
pub mod monitoring;
pub mod workload;

// Re-export commonly used types
pub use capability::{Aligner, FnAligner};
pub use execution::{CleanupPolicy, Engine, Execution, ExecutionError, ExecutionOptions, UnitError};
pub use workload::load_workload;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "ChunkRunner";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "ChunkRunner");
    }

    #[test]
    fn test_module_exports_engine() {
        let engine = Engine::new(FnAligner::new(
            |unit: &u8| Ok(vec![*unit]),
            |_: &[u8]| Ok(()),
        ));
        let records = engine.execute(&[1u8, 2, 3], &ExecutionOptions::default()).unwrap();
        assert_eq!(records, vec![1, 2, 3]);
    }

    #[test]
    fn test_version_format() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
        for part in parts {
            assert!(part.parse::<u32>().is_ok(), "Version components should be numeric");
        }
    }
}

//! Execution Errors
//!
//! Every failure the engine can surface to its caller. Failures raised by
//! the host capability are carried as boxed sources so the original error
//! chain stays intact.

use std::error::Error as StdError;

use thiserror::Error;

/// Error type returned by host-supplied `align` and `cleanup` calls.
pub type UnitError = Box<dyn StdError + Send + Sync>;

/// Errors raised while loading, partitioning, dispatching or gathering work.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The workload is not a finite ordered sequence of units.
    #[error("Invalid workload: {0}")]
    InvalidWorkload(String),

    /// `max_workers` or `chunk_size` is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `align` failed for a unit. Fatal to the whole call.
    #[error("Alignment failed for unit {unit_index} (chunk {chunk_index}): {source}")]
    AlignmentFailure {
        unit_index: usize,
        chunk_index: usize,
        #[source]
        source: UnitError,
    },

    /// `cleanup` failed for a unit while the abort policy was active.
    #[error("Cleanup failed for unit {unit_index} (chunk {chunk_index}): {source}")]
    CleanupFailure {
        unit_index: usize,
        chunk_index: usize,
        #[source]
        source: UnitError,
    },

    /// A chunk stopped early because another chunk already failed.
    ///
    /// Internal to the worker pool: the gatherer stops reading at the first
    /// failure, so this never reaches a caller of [`Engine`].
    ///
    /// [`Engine`]: super::Engine
    #[doc(hidden)]
    #[error("Chunk {chunk_index} cancelled after an earlier failure")]
    Cancelled { chunk_index: usize },

    /// `align` or `cleanup` panicked. Reported the same way on the
    /// sequential path and on worker threads.
    #[error("Aligner panicked during execution")]
    WorkerPanicked,

    /// A chunk result arrived with an index outside the partition, or twice.
    #[error("Unexpected result for chunk {chunk_index} ({expected} chunks dispatched)")]
    UnexpectedChunk { chunk_index: usize, expected: usize },

    /// The result channel closed before every chunk was gathered.
    #[error("Gathered {gathered} of {expected} chunk results")]
    IncompleteGather { expected: usize, gathered: usize },

    /// Reading a workload or options file failed.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A workload or options document could not be parsed.
    #[error("Failed to parse '{path}': {message}")]
    Parse { path: String, message: String },
}

impl ExecutionError {
    /// Index of the unit that triggered the failure, when one is known.
    pub fn unit_index(&self) -> Option<usize> {
        match self {
            Self::AlignmentFailure { unit_index, .. } | Self::CleanupFailure { unit_index, .. } => {
                Some(*unit_index)
            }
            _ => None,
        }
    }

    /// Index of the chunk that triggered the failure, when one is known.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            Self::AlignmentFailure { chunk_index, .. }
            | Self::CleanupFailure { chunk_index, .. }
            | Self::UnexpectedChunk { chunk_index, .. } => Some(*chunk_index),
            _ => None,
        }
    }

    /// Returns true for failures raised by the host capability.
    pub fn is_unit_failure(&self) -> bool {
        matches!(
            self,
            Self::AlignmentFailure { .. } | Self::CleanupFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_failure_display() {
        let err = ExecutionError::AlignmentFailure {
            unit_index: 2,
            chunk_index: 1,
            source: "bad sequence".into(),
        };

        let message = err.to_string();
        assert!(message.contains("unit 2"));
        assert!(message.contains("chunk 1"));
        assert!(message.contains("bad sequence"));
    }

    #[test]
    fn test_failure_indices() {
        let err = ExecutionError::CleanupFailure {
            unit_index: 7,
            chunk_index: 3,
            source: "disk full".into(),
        };

        assert_eq!(err.unit_index(), Some(7));
        assert_eq!(err.chunk_index(), Some(3));
        assert!(err.is_unit_failure());
    }

    #[test]
    fn test_source_chain_preserved() {
        let err = ExecutionError::AlignmentFailure {
            unit_index: 0,
            chunk_index: 0,
            source: "root cause".into(),
        };

        let source = err.source().expect("source should be set");
        assert_eq!(source.to_string(), "root cause");
    }

    #[test]
    fn test_non_unit_failures_have_no_indices() {
        let err = ExecutionError::InvalidConfiguration("chunk_size must be >= 1".to_string());
        assert_eq!(err.unit_index(), None);
        assert_eq!(err.chunk_index(), None);
        assert!(!err.is_unit_failure());

        let err = ExecutionError::IncompleteGather {
            expected: 4,
            gathered: 3,
        };
        assert_eq!(err.to_string(), "Gathered 3 of 4 chunk results");
    }

    #[test]
    fn test_unexpected_chunk_display() {
        let err = ExecutionError::UnexpectedChunk {
            chunk_index: 5,
            expected: 2,
        };
        assert_eq!(err.chunk_index(), Some(5));
        assert_eq!(
            err.to_string(),
            "Unexpected result for chunk 5 (2 chunks dispatched)"
        );
    }
}

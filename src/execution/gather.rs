//! Result Gathering
//!
//! Workers finish chunks in any order. The gatherer buffers early arrivals
//! by chunk index and appends a chunk's records to the output only once every
//! lower-indexed chunk has been appended, so the output is always a
//! contiguous, ordered prefix of the final result.

use std::collections::BTreeMap;

use log::debug;

use super::error::ExecutionError;
use super::processor::{ChunkResult, UnitStats};

/// Reassembles chunk results into workload order.
#[derive(Debug)]
pub struct ResultGatherer<R> {
    expected: usize,
    next_index: usize,
    pending: BTreeMap<usize, Vec<R>>,
    output: Vec<R>,
    stats: UnitStats,
}

impl<R> ResultGatherer<R> {
    /// Creates a gatherer expecting `expected` chunks, indexed `0..expected`.
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            next_index: 0,
            pending: BTreeMap::new(),
            output: Vec::new(),
            stats: UnitStats::default(),
        }
    }

    /// Accepts one chunk result and emits every newly contiguous chunk.
    ///
    /// Returns the number of chunks emitted by this call. Out-of-range and
    /// duplicate indices are rejected.
    pub fn accept(&mut self, result: ChunkResult<R>) -> Result<usize, ExecutionError> {
        let index = result.chunk_index;

        let duplicate = index < self.next_index || self.pending.contains_key(&index);
        if index >= self.expected || duplicate {
            return Err(ExecutionError::UnexpectedChunk {
                chunk_index: index,
                expected: self.expected,
            });
        }

        self.stats.merge(&result.stats);
        self.pending.insert(index, result.records);

        let mut emitted = 0;
        while let Some(records) = self.pending.remove(&self.next_index) {
            self.output.extend(records);
            self.next_index += 1;
            emitted += 1;
        }

        if emitted == 0 {
            debug!(
                "Buffered chunk {} (waiting for chunk {})",
                index, self.next_index
            );
        }

        Ok(emitted)
    }

    /// Number of chunks already appended to the output.
    pub fn emitted(&self) -> usize {
        self.next_index
    }

    /// Number of chunks received, emitted or still buffered.
    pub fn gathered(&self) -> usize {
        self.next_index + self.pending.len()
    }

    /// Returns true once every expected chunk has been emitted.
    pub fn is_complete(&self) -> bool {
        self.next_index == self.expected
    }

    /// The ordered prefix emitted so far.
    pub fn output(&self) -> &[R] {
        &self.output
    }

    /// Counters summed over every accepted chunk.
    pub fn stats(&self) -> UnitStats {
        self.stats
    }

    /// Returns the full result set.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::IncompleteGather`] if any chunk is missing.
    pub fn finish(self) -> Result<Vec<R>, ExecutionError> {
        if !self.is_complete() {
            return Err(ExecutionError::IncompleteGather {
                expected: self.expected,
                gathered: self.gathered(),
            });
        }

        Ok(self.output)
    }
}

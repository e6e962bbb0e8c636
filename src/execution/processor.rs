//! Unit Processing
//!
//! Runs the host capability over units in order: `align`, append the
//! records, then `cleanup` with exactly those records before moving on.
//! Both the worker pool and the sequential path go through
//! [`UnitProcessor::process_unit`], so they cannot drift apart.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, warn};

use crate::capability::Aligner;
use crate::workload::Chunk;

use super::error::ExecutionError;
use super::options::{CleanupPolicy, ExecutionOptions};

/// Counters collected while processing units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitStats {
    /// Units aligned
    pub units: usize,
    /// Records produced
    pub records: usize,
    /// Cleanup invocations
    pub cleanup_calls: usize,
    /// Cleanup invocations that returned an error
    pub cleanup_failures: usize,
}

impl UnitStats {
    /// Adds another set of counters to this one.
    pub fn merge(&mut self, other: &UnitStats) {
        self.units += other.units;
        self.records += other.records;
        self.cleanup_calls += other.cleanup_calls;
        self.cleanup_failures += other.cleanup_failures;
    }
}

/// Flattened output of one chunk, tagged with its index.
#[derive(Debug)]
pub struct ChunkResult<R> {
    /// Index of the chunk that produced these records
    pub chunk_index: usize,
    /// Records of every unit in the chunk, in unit order
    pub records: Vec<R>,
    /// Counters for this chunk
    pub stats: UnitStats,
}

/// Applies an aligner to units according to the cleanup options.
pub struct UnitProcessor<'a, A> {
    aligner: &'a A,
    cleanup: bool,
    policy: CleanupPolicy,
}

impl<A> Clone for UnitProcessor<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for UnitProcessor<'_, A> {}

impl<'a, A> UnitProcessor<'a, A> {
    /// Creates a processor bound to `aligner`.
    pub fn new(aligner: &'a A, options: &ExecutionOptions) -> Self {
        Self {
            aligner,
            cleanup: options.cleanup,
            policy: options.cleanup_policy,
        }
    }

    /// Aligns one unit and appends its records to `out`.
    ///
    /// When cleanup is enabled it runs with exactly the records this unit
    /// produced, before returning.
    pub fn process_unit<U>(
        &self,
        unit: &U,
        unit_index: usize,
        chunk_index: usize,
        out: &mut Vec<A::Record>,
        stats: &mut UnitStats,
    ) -> Result<(), ExecutionError>
    where
        A: Aligner<U>,
    {
        let records = self.aligner.align(unit).map_err(|source| {
            error!(
                "Alignment failed for unit {} (chunk {}): {}",
                unit_index, chunk_index, source
            );
            ExecutionError::AlignmentFailure {
                unit_index,
                chunk_index,
                source,
            }
        })?;

        let start = out.len();
        out.extend(records);

        stats.units += 1;
        stats.records += out.len() - start;

        if !self.cleanup {
            return Ok(());
        }

        stats.cleanup_calls += 1;
        if let Err(source) = self.aligner.cleanup(&out[start..]) {
            stats.cleanup_failures += 1;

            match self.policy {
                CleanupPolicy::Warn => {
                    warn!(
                        "Cleanup failed for unit {} (chunk {}): {}",
                        unit_index, chunk_index, source
                    );
                }
                CleanupPolicy::Abort => {
                    error!(
                        "Cleanup failed for unit {} (chunk {}): {}",
                        unit_index, chunk_index, source
                    );
                    return Err(ExecutionError::CleanupFailure {
                        unit_index,
                        chunk_index,
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    /// Processes every unit of a chunk in order.
    ///
    /// `cancel` is checked before each unit; once it is set the chunk stops
    /// with [`ExecutionError::Cancelled`].
    pub fn process_chunk<U>(
        &self,
        chunk: &Chunk<'_, U>,
        cancel: Option<&AtomicBool>,
    ) -> Result<ChunkResult<A::Record>, ExecutionError>
    where
        A: Aligner<U>,
    {
        let mut records = Vec::with_capacity(chunk.len());
        let mut stats = UnitStats::default();

        for (unit_index, unit) in chunk.indexed_units() {
            if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                debug!("Chunk {} cancelled at unit {}", chunk.index, unit_index);
                return Err(ExecutionError::Cancelled {
                    chunk_index: chunk.index,
                });
            }

            self.process_unit(unit, unit_index, chunk.index, &mut records, &mut stats)?;
        }

        debug!(
            "Chunk {} processed: {} units, {} records",
            chunk.index, stats.units, stats.records
        );

        Ok(ChunkResult {
            chunk_index: chunk.index,
            records,
            stats,
        })
    }
}

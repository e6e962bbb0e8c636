//! Workload Partitioning
//!
//! Splits a workload into contiguous, indexed chunks. Chunks borrow from the
//! caller's workload, so partitioning never copies units.

use log::debug;

use crate::execution::error::ExecutionError;

/// A contiguous slice of the workload dispatched as one piece of work.
#[derive(Debug)]
pub struct Chunk<'a, U> {
    /// Zero-based position of this chunk in workload order
    pub index: usize,
    /// Position of the first unit of this chunk in the workload
    pub offset: usize,
    /// Units belonging to this chunk
    pub units: &'a [U],
}

impl<'a, U> Chunk<'a, U> {
    /// Number of units in the chunk.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if the chunk holds no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterates units together with their workload-wide index.
    pub fn indexed_units(&self) -> impl Iterator<Item = (usize, &'a U)> + 'a {
        let offset = self.offset;
        let units = self.units;
        units
            .iter()
            .enumerate()
            .map(move |(i, unit)| (offset + i, unit))
    }
}

// Manual impls: a chunk is a pair of indices plus a shared slice, copyable
// regardless of whether `U` is.
impl<U> Clone for Chunk<'_, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for Chunk<'_, U> {}

/// Number of chunks a workload of `len` units splits into.
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    len.div_ceil(chunk_size)
}

/// Splits `workload` into chunks of at most `chunk_size` units.
///
/// Chunk `i` holds units `[i * chunk_size, min((i + 1) * chunk_size, len))`.
/// Only the last chunk may be shorter than `chunk_size`.
///
/// # Errors
///
/// Returns [`ExecutionError::InvalidConfiguration`] if `chunk_size` is zero.
pub fn partition<U>(workload: &[U], chunk_size: usize) -> Result<Vec<Chunk<'_, U>>, ExecutionError> {
    if chunk_size == 0 {
        return Err(ExecutionError::InvalidConfiguration(
            "chunk_size must be at least 1".to_string(),
        ));
    }

    let chunks: Vec<Chunk<'_, U>> = workload
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, units)| Chunk {
            index,
            offset: index * chunk_size,
            units,
        })
        .collect();

    debug!(
        "Partitioned {} units into {} chunks (chunk size {})",
        workload.len(),
        chunks.len(),
        chunk_size
    );

    Ok(chunks)
}

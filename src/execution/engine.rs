//! Chunked Execution Engine
//!
//! The entry point hosts call. An [`Engine`] owns the aligner; every
//! [`Engine::execute`] call validates its options, then either runs the
//! sequential path or partitions the workload and hands it to a fresh
//! [`WorkerPool`]. Nothing is kept between calls.

use std::time::Instant;

use chrono::Utc;
use log::{error, info};

use crate::capability::Aligner;
use crate::monitoring::{ExecutionReport, ExecutionTimeline};
use crate::workload::{chunk_count, partition};

use super::error::ExecutionError;
use super::options::ExecutionOptions;
use super::pool::WorkerPool;
use super::processor::UnitProcessor;
use super::sequential::execute_sequential;

/// Records of a successful call together with its report and timeline.
#[derive(Debug)]
pub struct Execution<R> {
    /// Flat result set in workload order
    pub records: Vec<R>,
    /// Counters and timing
    pub report: ExecutionReport,
    /// Per-chunk events (empty for sequential runs)
    pub timeline: ExecutionTimeline,
}

/// Chunked parallel execution engine.
///
/// # Example
///
/// ```rust
/// use chunkrunner::capability::FnAligner;
/// use chunkrunner::execution::{Engine, ExecutionOptions};
///
/// let engine = Engine::new(FnAligner::new(
///     |read: &String| Ok(vec![format!("{}_ref", read)]),
///     |_records: &[String]| Ok(()),
/// ));
///
/// let workload = vec!["A".to_string(), "B".to_string(), "C".to_string()];
/// let options = ExecutionOptions::new().with_max_workers(2).with_chunk_size(2);
///
/// let records = engine.execute(&workload, &options).unwrap();
/// assert_eq!(records, vec!["A_ref", "B_ref", "C_ref"]);
/// ```
#[derive(Debug)]
pub struct Engine<A> {
    aligner: A,
}

impl<A> Engine<A> {
    /// Creates an engine bound to `aligner`.
    pub fn new(aligner: A) -> Self {
        Self { aligner }
    }

    /// Returns the bound aligner.
    pub fn aligner(&self) -> &A {
        &self.aligner
    }

    /// Consumes the engine and returns the aligner.
    pub fn into_aligner(self) -> A {
        self.aligner
    }

    /// Runs `align` over every unit and returns all records in workload order.
    ///
    /// Blocks until every unit is processed. The first alignment failure (or
    /// cleanup failure under [`CleanupPolicy::Abort`]) fails the whole call
    /// and no records are returned. A panic inside the aligner is caught and
    /// returned as [`ExecutionError::WorkerPanicked`] for every worker count.
    ///
    /// [`CleanupPolicy::Abort`]: super::options::CleanupPolicy::Abort
    pub fn execute<U>(
        &self,
        workload: &[U],
        options: &ExecutionOptions,
    ) -> Result<Vec<A::Record>, ExecutionError>
    where
        U: Sync,
        A: Aligner<U> + Sync,
        A::Record: Send,
    {
        self.execute_with_report(workload, options)
            .map(|execution| execution.records)
    }

    /// Like [`Engine::execute`], but also returns a report and timeline.
    pub fn execute_with_report<U>(
        &self,
        workload: &[U],
        options: &ExecutionOptions,
    ) -> Result<Execution<A::Record>, ExecutionError>
    where
        U: Sync,
        A: Aligner<U> + Sync,
        A::Record: Send,
    {
        options.validate()?;

        let started_at = Utc::now();
        let start_time = Instant::now();
        let chunks = chunk_count(workload.len(), options.chunk_size);

        info!(
            "Starting execution ({} units, {} chunks of {}, max workers: {}, cleanup: {})",
            workload.len(),
            chunks,
            options.chunk_size,
            options.max_workers,
            options.cleanup
        );

        let processor = UnitProcessor::new(&self.aligner, options);
        let mut timeline = ExecutionTimeline::new();

        let result = if options.is_sequential() {
            execute_sequential(&processor, workload, options.chunk_size)
        } else {
            let pool = WorkerPool::new(options.max_workers);
            partition(workload, options.chunk_size)
                .and_then(|chunks| pool.run(processor, chunks, &mut timeline))
        };

        let (records, stats) = result.map_err(|e| {
            error!("Execution failed: {}", e);
            e
        })?;

        let elapsed_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = ExecutionReport::new(
            started_at,
            elapsed_ms,
            options.max_workers,
            options.chunk_size,
            chunks,
            stats,
        );

        info!(
            "Execution completed: {} records from {} units in {} ms",
            records.len(),
            stats.units,
            elapsed_ms
        );

        Ok(Execution {
            records,
            report,
            timeline,
        })
    }
}

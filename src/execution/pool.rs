//! Worker Pool
//!
//! Runs chunks on a fixed number of scoped worker threads. All chunks are
//! queued on a shared channel up front; workers pull whole chunks until the
//! queue is drained. The calling thread gathers results as they arrive.
//!
//! # Lifecycle
//!
//! The pool lives for exactly one [`WorkerPool::run`] call:
//!
//! 1. Queue every chunk and close the queue
//! 2. Spawn `workers` threads inside a crossbeam scope
//! 3. Gather on the calling thread until every chunk is in, or one fails
//! 4. Leave the scope, which joins every worker
//!
//! Gathering finishes before the scope is left, so the result set is always
//! captured before teardown. On failure the abort flag is raised first so
//! the remaining workers stop at their next unit instead of draining the
//! queue. A panic in `align` or `cleanup` is caught on the worker, raises the
//! flag itself and is reported as [`ExecutionError::WorkerPanicked`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, error, info};

use crate::capability::Aligner;
use crate::monitoring::{EventType, ExecutionTimeline};
use crate::workload::Chunk;

use super::error::ExecutionError;
use super::gather::ResultGatherer;
use super::processor::{ChunkResult, UnitProcessor, UnitStats};

/// Message sent from a worker to the gathering thread.
enum WorkerMessage<R> {
    Started {
        chunk_index: usize,
        worker_id: usize,
    },
    Finished {
        chunk_index: usize,
        worker_id: usize,
        outcome: Result<ChunkResult<R>, ExecutionError>,
    },
}

/// A pool of scoped worker threads, created per call.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Creates a pool that will spawn exactly `workers` threads.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Number of worker threads spawned per run.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Processes `chunks` and returns their records in chunk-index order.
    ///
    /// `chunks` must be indexed `0..chunks.len()`, as produced by
    /// [`crate::workload::partition`].
    pub fn run<'w, U, A>(
        &self,
        processor: UnitProcessor<'_, A>,
        chunks: Vec<Chunk<'w, U>>,
        timeline: &mut ExecutionTimeline,
    ) -> Result<(Vec<A::Record>, UnitStats), ExecutionError>
    where
        U: Sync,
        A: Aligner<U> + Sync,
        A::Record: Send,
    {
        let total_chunks = chunks.len();

        let (work_tx, work_rx): (Sender<Chunk<'w, U>>, Receiver<Chunk<'w, U>>) = unbounded();
        for chunk in chunks {
            if work_tx.send(chunk).is_err() {
                break; // Receiver dropped
            }
        }
        // Close the queue so idle workers exit once it is drained
        drop(work_tx);

        let (result_tx, result_rx) = unbounded();
        let abort = AtomicBool::new(false);
        let mut gatherer = ResultGatherer::new(total_chunks);

        info!(
            "Dispatching {} chunks to {} workers",
            total_chunks, self.workers
        );

        let gathered = crossbeam::thread::scope(|s| {
            for worker_id in 0..self.workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let abort = &abort;

                s.spawn(move |_| worker_loop(worker_id, processor, work_rx, result_tx, abort));
            }

            // Only workers hold senders now; the channel disconnects when they exit
            drop(result_tx);

            let gathered = gather(&result_rx, &mut gatherer, timeline);
            if gathered.is_err() {
                abort.store(true, Ordering::SeqCst);
            }
            gathered
        })
        .map_err(|_| {
            error!("A worker thread panicked; discarding partial results");
            ExecutionError::WorkerPanicked
        })?;

        gathered?;

        let stats = gatherer.stats();
        let records = gatherer.finish()?;

        debug!(
            "Worker pool shut down: {} chunks gathered, {} records",
            total_chunks,
            records.len()
        );

        Ok((records, stats))
    }
}

/// Pulls chunks until the queue is drained or the run is aborted.
fn worker_loop<U, A>(
    worker_id: usize,
    processor: UnitProcessor<'_, A>,
    work_rx: Receiver<Chunk<'_, U>>,
    result_tx: Sender<WorkerMessage<A::Record>>,
    abort: &AtomicBool,
) where
    A: Aligner<U>,
{
    let mut processed = 0;

    while let Ok(chunk) = work_rx.recv() {
        if abort.load(Ordering::SeqCst) {
            debug!("Worker {} stopping: run aborted", worker_id);
            break;
        }

        let started = WorkerMessage::Started {
            chunk_index: chunk.index,
            worker_id,
        };
        if result_tx.send(started).is_err() {
            break; // Gatherer gone
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| processor.process_chunk(&chunk, Some(abort))))
            .unwrap_or_else(|_| {
                error!("Worker {} panicked on chunk {}", worker_id, chunk.index);
                Err(ExecutionError::WorkerPanicked)
            });
        let panicked = matches!(outcome, Err(ExecutionError::WorkerPanicked));
        let failed = outcome.is_err();

        let finished = WorkerMessage::Finished {
            chunk_index: chunk.index,
            worker_id,
            outcome,
        };
        let sent = result_tx.send(finished).is_ok();

        // Raised only after the panic is queued, so it reaches the gatherer
        // ahead of any chunk cancelled because of it
        if panicked {
            abort.store(true, Ordering::SeqCst);
        }
        if !sent || failed {
            break;
        }

        processed += 1;
    }

    debug!("Worker {} exiting after {} chunks", worker_id, processed);
}

/// Receives worker messages until every chunk is gathered.
///
/// Returns the first chunk failure. If every worker exits before all chunks
/// arrive the loop ends and the gatherer reports the shortfall.
fn gather<R>(
    result_rx: &Receiver<WorkerMessage<R>>,
    gatherer: &mut ResultGatherer<R>,
    timeline: &mut ExecutionTimeline,
) -> Result<(), ExecutionError> {
    while !gatherer.is_complete() {
        let Ok(message) = result_rx.recv() else {
            break; // Every worker has exited
        };

        match message {
            WorkerMessage::Started {
                chunk_index,
                worker_id,
            } => {
                debug!("Worker {} started chunk {}", worker_id, chunk_index);
                timeline.add_event(chunk_index, worker_id, EventType::Started);
            }
            WorkerMessage::Finished {
                chunk_index,
                worker_id,
                outcome: Ok(result),
            } => {
                timeline.add_event(chunk_index, worker_id, EventType::Completed);
                gatherer.accept(result)?;
            }
            WorkerMessage::Finished {
                chunk_index,
                worker_id,
                outcome: Err(e),
            } => {
                timeline.add_event(chunk_index, worker_id, EventType::Failed);
                error!("Chunk {} failed on worker {}: {}", chunk_index, worker_id, e);
                return Err(e);
            }
        }
    }

    Ok(())
}

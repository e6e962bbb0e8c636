//! Sequential Execution
//!
//! The single-worker path: no partitioning, no channels, no threads. Units
//! are aligned in workload order straight into the result set.

use std::panic::{catch_unwind, AssertUnwindSafe};

use log::{debug, error};

use crate::capability::Aligner;

use super::error::ExecutionError;
use super::processor::{UnitProcessor, UnitStats};

/// Runs every unit of `workload` on the calling thread.
///
/// `chunk_size` only affects the chunk index reported in errors, which
/// matches the index the worker pool would have reported for the same unit.
/// A panic in `align` or `cleanup` is caught and returned as
/// [`ExecutionError::WorkerPanicked`], as on the worker pool.
pub fn execute_sequential<U, A>(
    processor: &UnitProcessor<'_, A>,
    workload: &[U],
    chunk_size: usize,
) -> Result<(Vec<A::Record>, UnitStats), ExecutionError>
where
    A: Aligner<U>,
{
    let chunk_size = chunk_size.max(1);
    let mut records = Vec::with_capacity(workload.len());
    let mut stats = UnitStats::default();

    let outcome = catch_unwind(AssertUnwindSafe(|| -> Result<(), ExecutionError> {
        for (unit_index, unit) in workload.iter().enumerate() {
            processor.process_unit(
                unit,
                unit_index,
                unit_index / chunk_size,
                &mut records,
                &mut stats,
            )?;
        }
        Ok(())
    }));

    match outcome {
        Ok(result) => result?,
        Err(_) => {
            error!("Aligner panicked on the sequential path");
            return Err(ExecutionError::WorkerPanicked);
        }
    }

    debug!(
        "Sequential run finished: {} units, {} records",
        stats.units, stats.records
    );

    Ok((records, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FnAligner;
    use crate::execution::error::UnitError;
    use crate::execution::options::ExecutionOptions;
    use crate::workload::partition;

    fn splitter() -> impl Aligner<String, Record = char> {
        FnAligner::new(
            |unit: &String| Ok(unit.chars().collect::<Vec<char>>()),
            |_: &[char]| Ok(()),
        )
    }

    #[test]
    fn test_sequential_flattens_in_order() {
        let aligner = splitter();
        let processor = UnitProcessor::new(&aligner, &ExecutionOptions::default());

        let workload = vec!["ab".to_string(), "".to_string(), "cde".to_string()];
        let (records, stats) = execute_sequential(&processor, &workload, 1).unwrap();

        assert_eq!(records, vec!['a', 'b', 'c', 'd', 'e']);
        assert_eq!(stats.units, 3);
        assert_eq!(stats.cleanup_calls, 3);
    }

    #[test]
    fn test_matches_chunked_processing() {
        let aligner = splitter();
        let processor = UnitProcessor::new(&aligner, &ExecutionOptions::default());
        let workload: Vec<String> = ["ac", "gt", "t", "", "gga"].iter().map(|s| s.to_string()).collect();

        let (sequential, _) = execute_sequential(&processor, &workload, 2).unwrap();

        let chunked: Vec<char> = partition(&workload, 2)
            .unwrap()
            .iter()
            .flat_map(|chunk| processor.process_chunk(chunk, None).unwrap().records)
            .collect();

        assert_eq!(sequential, chunked);
    }

    #[test]
    fn test_error_reports_equivalent_chunk_index() {
        let aligner = FnAligner::new(
            |unit: &u32| -> Result<Vec<u32>, UnitError> {
                if *unit == 7 {
                    Err("bad unit".into())
                } else {
                    Ok(vec![*unit])
                }
            },
            |_: &[u32]| Ok(()),
        );
        let processor = UnitProcessor::new(&aligner, &ExecutionOptions::default());
        let workload: Vec<u32> = (0..10).collect();

        let err = execute_sequential(&processor, &workload, 3).unwrap_err();
        assert_eq!(err.unit_index(), Some(7));
        assert_eq!(err.chunk_index(), Some(2));
    }

    #[test]
    fn test_panic_reported_like_worker_pool() {
        let aligner = FnAligner::new(
            |unit: &u32| -> Result<Vec<u32>, UnitError> {
                if *unit == 2 {
                    panic!("aligner bug");
                }
                Ok(vec![*unit])
            },
            |_: &[u32]| Ok(()),
        );
        let processor = UnitProcessor::new(&aligner, &ExecutionOptions::default());
        let workload: Vec<u32> = (0..5).collect();

        let err = execute_sequential(&processor, &workload, 1).unwrap_err();
        assert!(matches!(err, ExecutionError::WorkerPanicked));
    }

    #[test]
    fn test_empty_workload() {
        let aligner = splitter();
        let processor = UnitProcessor::new(&aligner, &ExecutionOptions::default());

        let (records, stats) = execute_sequential(&processor, &Vec::<String>::new(), 4).unwrap();
        assert!(records.is_empty());
        assert_eq!(stats, UnitStats::default());
    }
}

//! Execution Report
//!
//! Counters and timing for one `execute` call, printable as a summary or
//! serializable as JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::execution::processor::UnitStats;

/// Summary of a completed `execute` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// When the call started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the call in milliseconds
    pub elapsed_ms: u64,
    /// Worker count used (1 = sequential path)
    pub workers: usize,
    /// Chunk size requested
    pub chunk_size: usize,
    /// Number of chunks the workload splits into
    pub chunks: usize,
    /// Units aligned
    pub units: usize,
    /// Records in the result set
    pub records: usize,
    /// Cleanup invocations
    pub cleanup_calls: usize,
    /// Cleanup invocations that failed and were tolerated
    pub cleanup_failures: usize,
}

impl ExecutionReport {
    /// Builds a report from gathered counters.
    pub fn new(
        started_at: DateTime<Utc>,
        elapsed_ms: u64,
        workers: usize,
        chunk_size: usize,
        chunks: usize,
        stats: UnitStats,
    ) -> Self {
        Self {
            started_at,
            elapsed_ms,
            workers,
            chunk_size,
            chunks,
            units: stats.units,
            records: stats.records,
            cleanup_calls: stats.cleanup_calls,
            cleanup_failures: stats.cleanup_failures,
        }
    }

    /// Returns true if the call used the sequential path.
    pub fn was_sequential(&self) -> bool {
        self.workers == 1
    }

    /// Returns a human-readable summary.
    pub fn get_summary(&self) -> String {
        let mode = if self.was_sequential() {
            "sequential".to_string()
        } else {
            format!("{} workers", self.workers)
        };

        let mut summary = format!(
            "Execution Summary:\n  \
             Started: {}\n  \
             Mode: {}\n  \
             Chunks: {} (size {})\n  \
             Units: {}\n  \
             Records: {}\n  \
             Elapsed: {} ms",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            mode,
            self.chunks,
            self.chunk_size,
            self.units,
            self.records,
            self.elapsed_ms
        );

        if self.cleanup_calls > 0 {
            summary.push_str(&format!(
                "\n  Cleanup: {} calls, {} failed",
                self.cleanup_calls, self.cleanup_failures
            ));
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report(workers: usize) -> ExecutionReport {
        ExecutionReport::new(
            Utc::now(),
            12,
            workers,
            2,
            3,
            UnitStats {
                units: 5,
                records: 7,
                cleanup_calls: 5,
                cleanup_failures: 1,
            },
        )
    }

    #[test]
    fn test_report_from_stats() {
        let report = sample_report(4);

        assert_eq!(report.units, 5);
        assert_eq!(report.records, 7);
        assert_eq!(report.cleanup_failures, 1);
        assert!(!report.was_sequential());
    }

    #[test]
    fn test_summary_contents() {
        let summary = sample_report(1).get_summary();

        assert!(summary.contains("Mode: sequential"));
        assert!(summary.contains("Chunks: 3 (size 2)"));
        assert!(summary.contains("Cleanup: 5 calls, 1 failed"));
    }

    #[test]
    fn test_summary_omits_cleanup_when_disabled() {
        let mut report = sample_report(2);
        report.cleanup_calls = 0;
        report.cleanup_failures = 0;

        let summary = report.get_summary();
        assert!(summary.contains("Mode: 2 workers"));
        assert!(!summary.contains("Cleanup"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let json = serde_json::to_value(sample_report(3)).unwrap();

        assert_eq!(json["workers"], 3);
        assert_eq!(json["records"], 7);
        assert!(json["started_at"].is_string());
    }
}

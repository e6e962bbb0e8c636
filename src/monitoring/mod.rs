//! Execution Monitoring Module
//!
//! Per-call bookkeeping produced alongside the result set. Nothing here
//! outlives the `execute` call that created it.
//!
//! # Components
//!
//! - [`ExecutionTimeline`]: Chunk start/end timing for Gantt charts
//! - [`ExecutionReport`]: Counters and timing summary

pub mod report;
pub mod timeline;

pub use report::ExecutionReport;
pub use timeline::{EventType, ExecutionTimeline, TimelineEvent};

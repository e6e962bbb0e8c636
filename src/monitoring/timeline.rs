//! Execution Timeline
//!
//! Tracks chunk start/end times per worker for execution
//! reports and Gantt charts.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Type of timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// A worker picked up the chunk
    Started,
    /// The chunk finished successfully
    Completed,
    /// The chunk failed
    Failed,
}

/// A single event in the execution timeline.
#[derive(Debug, Clone)]
pub struct TimelineEvent {
    /// Index of the chunk
    pub chunk_index: usize,
    /// Worker that handled the chunk
    pub worker_id: usize,
    /// Type of event
    pub event_type: EventType,
    /// When the event occurred
    pub timestamp: Instant,
}

/// Tracks the execution timeline of one `execute` call.
///
/// Only the worker pool records events; a sequential run leaves the
/// timeline empty.
#[derive(Debug, Clone)]
pub struct ExecutionTimeline {
    events: Vec<TimelineEvent>,
    start_time: Instant,
}

impl ExecutionTimeline {
    /// Creates a new timeline starting now.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Records an event for a chunk.
    pub fn add_event(&mut self, chunk_index: usize, worker_id: usize, event_type: EventType) {
        self.events.push(TimelineEvent {
            chunk_index,
            worker_id,
            event_type,
            timestamp: Instant::now(),
        });
    }

    /// Returns all recorded events.
    pub fn get_events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the total elapsed time since timeline creation.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Number of chunks each worker started.
    pub fn chunks_per_worker(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            if event.event_type == EventType::Started {
                *counts.entry(event.worker_id).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Generates an ASCII Gantt chart, one row per chunk.
    pub fn gantt_chart(&self) -> String {
        let mut output = String::from("\nExecution Timeline:\n\n");

        let total_time = Instant::now().duration_since(self.start_time).as_millis();

        if total_time == 0 {
            return output;
        }

        // Scale to 50 characters width
        let scale = 50.0 / total_time as f64;

        // chunk -> (worker, start, end)
        let mut chunk_times: BTreeMap<usize, (usize, u128, u128)> = BTreeMap::new();

        for event in &self.events {
            let elapsed = event.timestamp.duration_since(self.start_time).as_millis();

            match event.event_type {
                EventType::Started => {
                    chunk_times.insert(event.chunk_index, (event.worker_id, elapsed, elapsed));
                }
                EventType::Completed | EventType::Failed => {
                    if let Some(times) = chunk_times.get_mut(&event.chunk_index) {
                        times.2 = elapsed;
                    }
                }
            }
        }

        for (chunk_index, (worker_id, start, end)) in chunk_times {
            let start_pos = (start as f64 * scale) as usize;
            let width = ((end - start) as f64 * scale).max(1.0) as usize;

            let mut bar = " ".repeat(start_pos);
            bar.push_str(&"#".repeat(width));

            output.push_str(&format!(
                "chunk {:<5} w{:<3} |{}| ({} ms)\n",
                chunk_index,
                worker_id,
                bar,
                end - start
            ));
        }

        output.push_str(&format!("\nTotal: {} ms\n", total_time));
        output
    }

    /// Returns chunk durations in milliseconds.
    pub fn get_durations(&self) -> HashMap<usize, u128> {
        let mut starts: HashMap<usize, u128> = HashMap::new();
        let mut durations: HashMap<usize, u128> = HashMap::new();

        for event in &self.events {
            let elapsed = event.timestamp.duration_since(self.start_time).as_millis();

            match event.event_type {
                EventType::Started => {
                    starts.insert(event.chunk_index, elapsed);
                }
                EventType::Completed | EventType::Failed => {
                    if let Some(start) = starts.get(&event.chunk_index) {
                        durations.insert(event.chunk_index, elapsed - start);
                    }
                }
            }
        }

        durations
    }
}

impl Default for ExecutionTimeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_timeline_creation() {
        let timeline = ExecutionTimeline::new();
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_get_durations() {
        let mut timeline = ExecutionTimeline::new();
        timeline.add_event(0, 1, EventType::Started);
        thread::sleep(Duration::from_millis(50));
        timeline.add_event(0, 1, EventType::Completed);

        let durations = timeline.get_durations();
        assert!(*durations.get(&0).unwrap() >= 50);
    }

    #[test]
    fn test_get_durations_only_started() {
        let mut timeline = ExecutionTimeline::new();
        timeline.add_event(3, 0, EventType::Started);

        assert!(timeline.get_durations().is_empty());
    }

    #[test]
    fn test_failed_event_closes_chunk() {
        let mut timeline = ExecutionTimeline::new();
        timeline.add_event(2, 0, EventType::Started);
        timeline.add_event(2, 0, EventType::Failed);

        let events = timeline.get_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type, EventType::Failed);
        assert!(timeline.get_durations().contains_key(&2));
    }

    #[test]
    fn test_chunks_per_worker() {
        let mut timeline = ExecutionTimeline::new();
        timeline.add_event(0, 0, EventType::Started);
        timeline.add_event(1, 1, EventType::Started);
        timeline.add_event(0, 0, EventType::Completed);
        timeline.add_event(2, 0, EventType::Started);

        let counts = timeline.chunks_per_worker();
        assert_eq!(counts.get(&0), Some(&2));
        assert_eq!(counts.get(&1), Some(&1));
    }

    #[test]
    fn test_gantt_chart_generation() {
        let mut timeline = ExecutionTimeline::new();

        timeline.add_event(0, 0, EventType::Started);
        thread::sleep(Duration::from_millis(30));
        timeline.add_event(0, 0, EventType::Completed);
        timeline.add_event(1, 1, EventType::Started);
        thread::sleep(Duration::from_millis(30));
        timeline.add_event(1, 1, EventType::Completed);

        let chart = timeline.gantt_chart();
        assert!(chart.contains("chunk 0"));
        assert!(chart.contains("chunk 1"));
        assert!(chart.contains("Total:"));
    }

    #[test]
    fn test_gantt_chart_empty() {
        let timeline = ExecutionTimeline::default();
        assert!(timeline.gantt_chart().contains("Timeline"));
    }
}

//! Metrics sink handle carried by the configuration.
//!
//! The admission core never records anything itself; it stores the sink so
//! the thread pool and worker manager can report through it.

use std::fmt::Debug;

/// Receiver for thread-pool and worker events.
///
/// All methods default to no-ops so sinks only implement what they export.
pub trait MetricsSink: Send + Sync + Debug {
    /// Total PHP threads currently running.
    fn total_threads(&self, _count: usize) {}

    /// Configured instance count for a worker.
    fn total_workers(&self, _name: &str, _count: usize) {}

    /// A worker instance started.
    fn start_worker(&self, _name: &str) {}

    /// A worker instance stopped.
    fn stop_worker(&self, _name: &str) {}

    /// A request started waiting for a free thread.
    fn queued_request(&self) {}

    /// A waiting request got a thread or gave up.
    fn dequeued_request(&self) {}
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMetrics;

impl MetricsSink for NullMetrics {}

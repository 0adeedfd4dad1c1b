//! Metrics collection for pool monitoring.

use hdrhistogram::Histogram;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters and pass-latency distribution for one pool.
#[derive(Debug)]
pub struct Metrics {
    passes_executed: AtomicU64,
    tasks_completed: AtomicU64,
    tasks_recirculated: AtomicU64,
    tasks_panicked: AtomicU64,
    tasks_discarded: AtomicU64,

    // Pass latency histogram (RwLock for interior mutability)
    pass_latency: RwLock<Histogram<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        // 3 significant figures, max value of 1 hour in nanoseconds
        let histogram =
            Histogram::new_with_max(3_600_000_000_000, 3).expect("Failed to create histogram");

        Self {
            passes_executed: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
            tasks_recirculated: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            tasks_discarded: AtomicU64::new(0),
            pass_latency: RwLock::new(histogram),
        }
    }

    /// Record one execution pass with its duration.
    pub fn record_pass(&self, duration_ns: u64) {
        self.passes_executed.fetch_add(1, Ordering::Relaxed);

        if let Some(mut hist) = self.pass_latency.try_write() {
            let _ = hist.record(duration_ns);
        }
    }

    /// Record a task that finished and was released.
    pub fn record_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a task routed to the return queue for another pass.
    pub fn record_recirculated(&self) {
        self.tasks_recirculated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a pass that ended in a panic.
    pub fn record_panic(&self) {
        self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Record tasks dropped unexecuted at shutdown.
    pub fn record_discarded(&self, count: u64) {
        self.tasks_discarded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let hist = self.pass_latency.read();

        MetricsSnapshot {
            passes_executed: self.passes_executed.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_recirculated: self.tasks_recirculated.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            tasks_discarded: self.tasks_discarded.load(Ordering::Relaxed),
            pass_latency_p50_ns: hist.value_at_quantile(0.50),
            pass_latency_p99_ns: hist.value_at_quantile(0.99),
            pass_latency_max_ns: hist.max(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the pool's counters.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub passes_executed: u64,
    pub tasks_completed: u64,
    pub tasks_recirculated: u64,
    pub tasks_panicked: u64,
    pub tasks_discarded: u64,
    pub pass_latency_p50_ns: u64,
    pub pass_latency_p99_ns: u64,
    pub pass_latency_max_ns: u64,
}

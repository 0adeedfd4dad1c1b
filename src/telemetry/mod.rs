//! Observability for the pool: execution counters and pass-latency
//! distribution.

pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};

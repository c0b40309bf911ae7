//! The three benchmark drivers and their shared statistics.
//!
//! Each driver owns one session from connect to close and produces
//! exactly one [`Outcome`](crate::report::Outcome). Drivers are run in
//! isolation, one benchmark per process invocation.

pub mod latency;
pub mod memory;
pub mod stats;
pub mod throughput;

pub use stats::{LatencySummary, Sample, summarize};

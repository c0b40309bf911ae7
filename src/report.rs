//! Benchmark result records.
//!
//! Each run produces exactly one record, printed as a single JSON
//! object on stdout: a benchmark-specific success shape, or a failure
//! shape carrying the reason and whatever partial data the driver could
//! salvage. Field names and rounding are part of the output contract;
//! downstream tooling parses them.

use serde::Serialize;

/// A successful benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "test", rename_all = "lowercase")]
pub enum BenchReport {
    /// Keystroke round-trip latency statistics, in milliseconds.
    Latency {
        /// Number of samples actually collected (missed echoes reduce
        /// this below the attempt count).
        samples: usize,
        p50_ms: f64,
        p95_ms: f64,
        p99_ms: f64,
        min_ms: f64,
        max_ms: f64,
    },

    /// Sustained output throughput.
    Throughput {
        /// Total data-channel payload bytes received.
        total_bytes: u64,
        /// Seconds from command send to detected completion.
        elapsed_seconds: f64,
        /// `(total_bytes / 1024) / elapsed_seconds`.
        throughput_kbs: f64,
    },

    /// Server memory growth under large-output load, in megabytes.
    Memory {
        initial_rss_mb: f64,
        peak_rss_mb: f64,
        final_rss_mb: f64,
        /// Number of RSS samples collected.
        samples: usize,
    },
}

/// A failed benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchFailure {
    /// Human-readable failure reason.
    pub error: String,

    /// Partial byte count, when the throughput driver got some data but
    /// not enough to report a rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
}

impl BenchFailure {
    /// A failure with no partial data.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            total_bytes: None,
        }
    }

    /// A failure carrying a partial byte count.
    #[must_use]
    pub fn with_bytes(error: impl Into<String>, total_bytes: u64) -> Self {
        Self {
            error: error.into(),
            total_bytes: Some(total_bytes),
        }
    }
}

/// The terminal outcome of a run: success or failure, never both, never
/// neither.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Report(BenchReport),
    Failure(BenchFailure),
}

impl Outcome {
    /// Render the record as pretty-printed JSON.
    ///
    /// Serialization of these shapes cannot fail; a formatter error
    /// would be a bug, so this panics rather than returning `Result`.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("report serialization")
    }

    /// Whether this outcome is a failure record.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }
}

impl From<BenchReport> for Outcome {
    fn from(report: BenchReport) -> Self {
        Outcome::Report(report)
    }
}

impl From<BenchFailure> for Outcome {
    fn from(failure: BenchFailure) -> Self {
        Outcome::Failure(failure)
    }
}

/// Round to two decimal places (milliseconds, KB/s).
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to three decimal places (seconds).
#[must_use]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Round to one decimal place (megabytes).
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

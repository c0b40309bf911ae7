//! Keystroke round-trip latency benchmark.
//!
//! Repeatedly sends a single probe character down the data channel and
//! times how long the echo takes to come back. Iterations whose echo
//! misses the deadline are dropped silently: missed echoes reduce the
//! sample count, they do not fail the run.

use std::time::Instant;

use tokio::time::{sleep, timeout};

use crate::config::BenchConfig;
use crate::error::Result;
use crate::report::{BenchFailure, BenchReport, Outcome, round2};
use crate::session::Session;

use super::stats::summarize;

/// The fixed probe character echoed back by the remote shell.
const PROBE: u8 = b'x';

/// Run the latency benchmark against the configured endpoint.
///
/// Always produces a record: transport failures and empty sample sets
/// become failure records, never panics or propagated errors.
pub async fn run(config: &BenchConfig) -> Outcome {
    match collect(config).await {
        Ok(samples) => reduce(&samples),
        Err(err) => BenchFailure::new(err.to_string()).into(),
    }
}

/// Drive the session and collect round-trip samples in milliseconds.
async fn collect(config: &BenchConfig) -> Result<Vec<f64>> {
    let mut session = Session::connect(config).await?;
    session.bootstrap(config).await?;

    let mut samples = Vec::with_capacity(config.latency_samples);
    for _ in 0..config.latency_samples {
        let start = Instant::now();
        session.send_data(&[PROBE]).await?;

        match timeout(config.timeouts.echo, wait_for_echo(&mut session)).await {
            Ok(Ok(true)) => samples.push(start.elapsed().as_secs_f64() * 1000.0),
            Ok(Ok(false)) => break, // connection ended, reduce what we have
            Ok(Err(err)) => return Err(err),
            Err(_) => {} // echo missed its deadline, drop this iteration
        }

        sleep(config.pacing).await;
    }

    // Ctrl-C whatever the probes left running on the remote side. The
    // connection may already be gone; the samples still count.
    if let Err(err) = session.send_interrupt().await {
        tracing::debug!(error = %err, "interrupt not delivered");
    }
    session.close().await;

    Ok(samples)
}

/// Wait until a data payload containing the probe character arrives.
///
/// Returns `false` when the connection closes first.
async fn wait_for_echo(session: &mut Session) -> Result<bool> {
    while let Some(payload) = session.next_data().await? {
        if String::from_utf8_lossy(&payload).contains(PROBE as char) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Reduce collected samples to the latency record.
fn reduce(samples: &[f64]) -> Outcome {
    match summarize(samples) {
        Some(summary) => BenchReport::Latency {
            samples: samples.len(),
            p50_ms: round2(summary.p50),
            p95_ms: round2(summary.p95),
            p99_ms: round2(summary.p99),
            min_ms: round2(summary.min),
            max_ms: round2(summary.max),
        }
        .into(),
        None => BenchFailure::new("no samples collected").into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_populates_percentiles() {
        let outcome = reduce(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        match outcome {
            Outcome::Report(BenchReport::Latency {
                samples,
                p50_ms,
                p95_ms,
                p99_ms,
                min_ms,
                max_ms,
            }) => {
                assert_eq!(samples, 5);
                assert_eq!(p50_ms, 30.0);
                assert_eq!(p95_ms, 50.0);
                assert_eq!(p99_ms, 50.0);
                assert_eq!(min_ms, 10.0);
                assert_eq!(max_ms, 50.0);
            }
            other => panic!("expected latency report, got {other:?}"),
        }
    }

    #[test]
    fn test_reduce_rounds_to_two_decimals() {
        let outcome = reduce(&[3.14159]);
        match outcome {
            Outcome::Report(BenchReport::Latency { p50_ms, .. }) => assert_eq!(p50_ms, 3.14),
            other => panic!("expected latency report, got {other:?}"),
        }
    }

    #[test]
    fn test_reduce_empty_is_failure() {
        let outcome = reduce(&[]);
        match outcome {
            Outcome::Failure(failure) => {
                assert_eq!(failure.error, "no samples collected");
                assert!(failure.total_bytes.is_none());
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

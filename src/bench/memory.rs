//! Server memory growth benchmark.
//!
//! Two cooperative activities run side by side: the WebSocket session
//! pushing a large binary-to-text dump through the terminal, and an
//! out-of-band sampler polling the server's RSS in the OS process
//! table. They share nothing but a single-writer sample channel, which
//! is drained once, after the session phase, at reduction time.
//!
//! The sampler is aborted on every path out of the session phase,
//! whether that is success, deadline expiry, or transport failure, so
//! it can never
//! outlive the run.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use crate::config::BenchConfig;
use crate::error::Result;
use crate::report::{BenchFailure, BenchReport, Outcome, round1};
use crate::rss::{RssProbe, spawn_sampler};
use crate::session::{Inbound, Session};

use super::stats::Sample;

/// Shell command producing the large formatted dump (~5 MB of source
/// bytes, expanded several-fold by the hex formatting).
const COMMAND: &str = "head -c 5000000 /dev/zero | xxd\r";

/// Run the memory benchmark against the configured endpoint.
///
/// The probe is injected so tests can run against a fake process table;
/// production callers pass [`PgrepProbe`](crate::rss::PgrepProbe).
pub async fn run(config: &BenchConfig, probe: Arc<dyn RssProbe>) -> Outcome {
    let mut samples = Vec::new();

    // First reading before the session opens, so the baseline is not
    // already inflated by connection setup.
    let initial = {
        let probe = Arc::clone(&probe);
        let name = config.process_name.clone();
        tokio::task::spawn_blocking(move || probe.lookup_rss_kb(&name))
            .await
            .ok()
            .flatten()
    };
    if let Some(kb) = initial {
        samples.push(Sample::new(kb as f64 / 1024.0, Duration::ZERO));
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sampler = spawn_sampler(
        probe,
        config.process_name.clone(),
        config.sample_interval,
        tx,
    );

    // No early return between the spawn above and the abort below: the
    // sampler must be cancelled on every path out of the session phase.
    let session_result = drive_session(config).await;
    sampler.abort();

    if let Err(err) = session_result {
        tracing::warn!(error = %err, "session ended abnormally, reducing collected samples");
    }

    while let Ok(sample) = rx.try_recv() {
        samples.push(sample);
    }

    reduce(&samples)
}

/// The session half: bootstrap, trigger the dump, collect until the
/// byte threshold or the collection deadline, settle, close.
async fn drive_session(config: &BenchConfig) -> Result<()> {
    let mut session = Session::connect(config).await?;
    session.bootstrap(config).await?;

    session.send_data(COMMAND.as_bytes()).await?;

    let collected = timeout(
        config.timeouts.collection,
        drain_dump(&mut session, config.memory_byte_threshold),
    )
    .await;
    match collected {
        Ok(result) => result?,
        Err(_) => {} // deadline reached with the dump still flowing
    }

    // Let the server finish flushing before the teardown reading.
    sleep(config.timeouts.settle).await;
    session.close().await;
    Ok(())
}

/// Count data-channel payload bytes until the threshold is exceeded or
/// the connection closes.
async fn drain_dump(session: &mut Session, byte_threshold: u64) -> Result<()> {
    let mut received = 0u64;
    loop {
        match session.recv().await? {
            Inbound::Data(payload) => {
                received += payload.len() as u64;
                if received > byte_threshold {
                    return Ok(());
                }
            }
            Inbound::Ignored => {}
            Inbound::Closed => return Ok(()),
        }
    }
}

/// Reduce the sample sequence to the memory record.
fn reduce(samples: &[Sample]) -> Outcome {
    let first = match samples.first() {
        Some(sample) => sample.value,
        None => return BenchFailure::new("no RSS samples collected").into(),
    };
    let last = samples.last().map_or(first, |sample| sample.value);
    let peak = samples.iter().map(|sample| sample.value).fold(first, f64::max);

    BenchReport::Memory {
        initial_rss_mb: round1(first),
        peak_rss_mb: round1(peak),
        final_rss_mb: round1(last),
        samples: samples.len(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_at(value: f64, ms: u64) -> Sample {
        Sample::new(value, Duration::from_millis(ms))
    }

    #[test]
    fn test_reduce_first_peak_final() {
        let samples = [
            sample_at(12.5, 0),
            sample_at(30.2, 500),
            sample_at(48.14, 1000),
            sample_at(31.0, 1500),
        ];
        match reduce(&samples) {
            Outcome::Report(BenchReport::Memory {
                initial_rss_mb,
                peak_rss_mb,
                final_rss_mb,
                samples,
            }) => {
                assert_eq!(initial_rss_mb, 12.5);
                assert_eq!(peak_rss_mb, 48.1);
                assert_eq!(final_rss_mb, 31.0);
                assert_eq!(samples, 4);
            }
            other => panic!("expected memory report, got {other:?}"),
        }
    }

    #[test]
    fn test_reduce_single_sample() {
        match reduce(&[sample_at(20.0, 0)]) {
            Outcome::Report(BenchReport::Memory {
                initial_rss_mb,
                peak_rss_mb,
                final_rss_mb,
                samples,
            }) => {
                assert_eq!(initial_rss_mb, 20.0);
                assert_eq!(peak_rss_mb, 20.0);
                assert_eq!(final_rss_mb, 20.0);
                assert_eq!(samples, 1);
            }
            other => panic!("expected memory report, got {other:?}"),
        }
    }

    #[test]
    fn test_reduce_empty_is_failure() {
        match reduce(&[]) {
            Outcome::Failure(failure) => {
                assert_eq!(failure.error, "no RSS samples collected");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

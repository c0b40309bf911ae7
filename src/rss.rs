//! Out-of-band process memory inspection.
//!
//! The memory benchmark watches the server's resident set size from
//! outside the WebSocket session. The OS lookup hides behind the narrow
//! [`RssProbe`] capability so the sampler logic runs against a fake
//! process table in tests.

use std::process::Command;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bench::stats::Sample;

/// Capability to look up a process's resident memory.
pub trait RssProbe: Send + Sync + 'static {
    /// Resident set size in kilobytes of the first process whose
    /// command line contains `name_substring`.
    ///
    /// Any failure (tool missing, no match, ambiguous output, parse
    /// error) yields `None`. Never panics, never blocks longer than the
    /// underlying process-table query.
    fn lookup_rss_kb(&self, name_substring: &str) -> Option<u64>;
}

/// Probe backed by `pgrep -f` and `ps -o rss=`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgrepProbe;

impl RssProbe for PgrepProbe {
    fn lookup_rss_kb(&self, name_substring: &str) -> Option<u64> {
        let pgrep = Command::new("pgrep")
            .arg("-f")
            .arg(name_substring)
            .output()
            .ok()?;
        let pids = String::from_utf8_lossy(&pgrep.stdout);
        let pid = pids.lines().next()?.trim();
        if pid.is_empty() {
            return None;
        }

        let ps = Command::new("ps")
            .args(["-o", "rss=", "-p", pid])
            .output()
            .ok()?;
        String::from_utf8_lossy(&ps.stdout).trim().parse().ok()
    }
}

/// Spawn the polling sampler task.
///
/// Every `interval` the probe is queried (on the blocking pool, so the
/// process-table shellout never stalls the runtime) and a successful
/// reading is pushed into `tx` as megabytes. Lookup misses skip that
/// tick; the loop itself runs until the task is aborted or the receiver
/// is dropped. The sampler is the channel's only writer; consumers
/// drain it once, at reduction time.
pub fn spawn_sampler(
    probe: Arc<dyn RssProbe>,
    process_name: String,
    interval: Duration,
    tx: mpsc::UnboundedSender<Sample>,
) -> JoinHandle<()> {
    let started = Instant::now();
    tokio::spawn(async move {
        loop {
            let probe = Arc::clone(&probe);
            let name = process_name.clone();
            let rss_kb = tokio::task::spawn_blocking(move || probe.lookup_rss_kb(&name))
                .await
                .ok()
                .flatten();

            if let Some(kb) = rss_kb {
                let sample = Sample::new(kb as f64 / 1024.0, started.elapsed());
                if tx.send(sample).is_err() {
                    break;
                }
            }

            tokio::time::sleep(interval).await;
        }
    })
}

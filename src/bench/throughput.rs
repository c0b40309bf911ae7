//! Sustained output throughput benchmark.
//!
//! Sends one shell command that emits a bounded flood of output and
//! times the flood from command send to completion. Completion has two
//! detectors, checked in a fixed order per the observed protocol
//! behavior:
//!
//! 1. per received frame: a completion-mode prompt sighting, accepted
//!    only past the byte floor (the command line itself echoes prompt
//!    characters, so early sightings are ignored);
//! 2. between frames: two consecutive empty idle windows, also only
//!    past the byte floor.
//!
//! The two conditions can race within one polling window; which fires
//! first is deliberately left as-is rather than redesigned, since the
//! wire protocol offers no authoritative completion signal.

use std::time::Instant;

use tokio::time::timeout;

use crate::config::BenchConfig;
use crate::error::Result;
use crate::protocol::prompt::line_ends_with_marker;
use crate::report::{BenchFailure, BenchReport, Outcome, round2, round3};
use crate::session::{Inbound, Session};

/// Shell command generating the bounded output flood.
const COMMAND: &str = "yes | head -c 3000000\r";

/// Consecutive empty idle windows that declare the flood over.
const IDLE_LIMIT: u32 = 2;

/// Per-frame completion check: a completion-mode prompt sighting in
/// this payload, accepted only once `total_bytes` has cleared the
/// floor. Below the floor the sighting is assumed to be the command
/// line's own prompt characters echoing back.
fn prompt_past_floor(payload: &[u8], total_bytes: u64, byte_floor: u64) -> bool {
    if total_bytes <= byte_floor {
        return false;
    }
    line_ends_with_marker(&String::from_utf8_lossy(payload))
}

/// Run the throughput benchmark against the configured endpoint.
pub async fn run(config: &BenchConfig) -> Outcome {
    match collect(config).await {
        Ok(collection) => reduce(&collection, config.byte_floor),
        Err(err) => BenchFailure::new(err.to_string()).into(),
    }
}

/// What the collection phase measured.
struct Collection {
    total_bytes: u64,
    started: Option<Instant>,
    ended: Option<Instant>,
}

/// Drive the session and count flood bytes until completion.
async fn collect(config: &BenchConfig) -> Result<Collection> {
    let mut session = Session::connect(config).await?;
    session.bootstrap(config).await?;

    let started = Instant::now();
    session.send_data(COMMAND.as_bytes()).await?;

    let mut collection = Collection {
        total_bytes: 0,
        started: Some(started),
        ended: None,
    };

    let outcome = timeout(
        config.timeouts.overall,
        drain_flood(&mut session, config, &mut collection),
    )
    .await;
    match outcome {
        Ok(result) => result?,
        Err(_) => collection.ended = Some(Instant::now()), // hard deadline
    }

    session.close().await;
    Ok(collection)
}

/// Receive frames until one of the completion conditions fires.
///
/// Sets `collection.ended` on completion; returns with `ended` unset
/// only when the connection closes below the byte floor.
async fn drain_flood(
    session: &mut Session,
    config: &BenchConfig,
    collection: &mut Collection,
) -> Result<()> {
    let mut idle_windows = 0u32;
    loop {
        let inbound = match timeout(config.timeouts.idle, session.recv()).await {
            Ok(inbound) => inbound?,
            Err(_) => {
                // Idle window expired with no traffic at all.
                idle_windows += 1;
                if idle_windows >= IDLE_LIMIT && collection.total_bytes > config.byte_floor {
                    collection.ended = Some(Instant::now());
                    return Ok(());
                }
                continue;
            }
        };

        // Any message, data or not, resets the idle accounting.
        idle_windows = 0;

        match inbound {
            Inbound::Data(payload) => {
                collection.total_bytes += payload.len() as u64;
                if prompt_past_floor(&payload, collection.total_bytes, config.byte_floor) {
                    collection.ended = Some(Instant::now());
                    return Ok(());
                }
            }
            Inbound::Ignored => {}
            Inbound::Closed => {
                if collection.total_bytes > config.byte_floor {
                    collection.ended = Some(Instant::now());
                }
                return Ok(());
            }
        }
    }
}

/// Reduce the collection to the throughput record.
fn reduce(collection: &Collection, byte_floor: u64) -> Outcome {
    match (collection.started, collection.ended) {
        (Some(started), Some(ended)) if collection.total_bytes > byte_floor => {
            let elapsed = ended.duration_since(started).as_secs_f64();
            let kbs = (collection.total_bytes as f64 / 1024.0) / elapsed;
            BenchReport::Throughput {
                total_bytes: collection.total_bytes,
                elapsed_seconds: round3(elapsed),
                throughput_kbs: round2(kbs),
            }
            .into()
        }
        _ => BenchFailure::with_bytes("timeout or incomplete", collection.total_bytes).into(),
    }
}

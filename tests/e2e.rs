//! End-to-end driver tests against synthetic terminal-server doubles.
//!
//! Each test binds a real listener on a loopback port, speaks the
//! channel-tagged terminal protocol the way the server under test
//! does, and drives the public benchmark API against it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use ttybench::report::{BenchReport, Outcome};
use ttybench::rss::RssProbe;
use ttybench::{BenchConfig, Endpoint, Timeouts, bench};

const DATA: u8 = 0x30;
const INTERRUPT: u8 = 0x03;

fn data_frame(payload: &[u8]) -> Message {
    let mut message = Vec::with_capacity(1 + payload.len());
    message.push(DATA);
    message.extend_from_slice(payload);
    Message::Binary(message)
}

/// Bind a loopback listener and serve exactly one connection with the
/// given handler.
async fn spawn_double<F, Fut>(handler: F) -> (SocketAddr, JoinHandle<()>)
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _peer) = listener.accept().await.unwrap();
        handler(stream).await;
    });
    (addr, handle)
}

/// Read and validate the session handshake, which must be the first
/// message on the wire.
async fn expect_init(
    ws: &mut tokio_tungstenite::WebSocketStream<TcpStream>,
) -> serde_json::Value {
    let first = ws.next().await.expect("client hung up").expect("transport");
    let init: serde_json::Value =
        serde_json::from_slice(&first.into_data()).expect("first message must be the init JSON");
    assert!(init.get("AuthToken").is_some());
    assert_eq!(init["columns"], 80);
    assert_eq!(init["rows"], 24);
    init
}

fn config_for(addr: SocketAddr) -> BenchConfig {
    BenchConfig::new().with_endpoint(Endpoint::new(addr.ip().to_string(), addr.port()))
}

// =============================================================================
// Latency
// =============================================================================

#[tokio::test]
async fn test_latency_echo_yields_full_sample_set() {
    let (addr, server) = spawn_double(|stream| async move {
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        expect_init(&mut ws).await;
        ws.send(data_frame(b"Welcome\r\nuser@host:~$ ")).await.unwrap();

        let mut interrupted = false;
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Binary(data) = msg {
                if data.len() < 2 || data[0] != DATA {
                    continue;
                }
                if data[1] == INTERRUPT {
                    interrupted = true;
                    continue;
                }
                ws.send(data_frame(&data[1..])).await.unwrap();
            }
        }
        assert!(interrupted, "driver must send Ctrl-C before closing");
    })
    .await;

    let config = config_for(addr).with_pacing(Duration::ZERO);
    let outcome = bench::latency::run(&config).await;

    match outcome {
        Outcome::Report(BenchReport::Latency {
            samples,
            p50_ms,
            p95_ms,
            p99_ms,
            min_ms,
            max_ms,
        }) => {
            assert_eq!(samples, 50);
            assert!(min_ms <= p50_ms);
            assert!(p50_ms <= p95_ms);
            assert!(p95_ms <= p99_ms);
            assert!(p99_ms <= max_ms);
        }
        other => panic!("expected latency report, got {other:?}"),
    }

    server.await.unwrap();
}

#[tokio::test]
async fn test_latency_deaf_shell_is_failure() {
    let (addr, _server) = spawn_double(|stream| async move {
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        expect_init(&mut ws).await;
        ws.send(data_frame(b"user@host:~$ ")).await.unwrap();
        // Swallow everything; echo nothing.
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let mut config = config_for(addr)
        .with_latency_samples(3)
        .with_pacing(Duration::ZERO);
    config.timeouts = Timeouts {
        echo: Duration::from_millis(50),
        ..Timeouts::default()
    };

    let outcome = bench::latency::run(&config).await;
    match outcome {
        Outcome::Failure(failure) => assert_eq!(failure.error, "no samples collected"),
        other => panic!("expected failure, got {other:?}"),
    }
}

// =============================================================================
// Throughput
// =============================================================================

#[tokio::test]
async fn test_throughput_prompt_completion() {
    const CHUNK: usize = 30_000;
    const CHUNKS: usize = 10;

    let (addr, server) = spawn_double(|stream| async move {
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        expect_init(&mut ws).await;
        ws.send(data_frame(b"user@host:~$ ")).await.unwrap();

        // Wait for the flood command, then deliver the flood and the
        // returning prompt.
        loop {
            let msg = ws.next().await.expect("no command").expect("transport");
            if let Message::Binary(data) = msg {
                if data.len() >= 2 && data[0] == DATA {
                    assert!(String::from_utf8_lossy(&data[1..]).contains("head -c"));
                    break;
                }
            }
        }
        let chunk = vec![b'y'; CHUNK];
        for _ in 0..CHUNKS {
            ws.send(data_frame(&chunk)).await.unwrap();
        }
        ws.send(data_frame(b"\r\nuser@host:~$ ")).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let outcome = bench::throughput::run(&config_for(addr)).await;
    match outcome {
        Outcome::Report(BenchReport::Throughput {
            total_bytes,
            elapsed_seconds,
            throughput_kbs,
        }) => {
            assert!(total_bytes > (CHUNK * CHUNKS) as u64);
            assert!(elapsed_seconds >= 0.0);
            assert!(throughput_kbs > 0.0);
        }
        other => panic!("expected throughput report, got {other:?}"),
    }

    server.await.unwrap();
}

#[tokio::test]
async fn test_throughput_below_byte_floor_is_failure() {
    const SHORT: usize = 10_000;

    let (addr, _server) = spawn_double(|stream| async move {
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        expect_init(&mut ws).await;
        ws.send(data_frame(b"user@host:~$ ")).await.unwrap();

        loop {
            let msg = ws.next().await.expect("no command").expect("transport");
            if let Message::Binary(data) = msg {
                if data.len() >= 2 && data[0] == DATA {
                    break;
                }
            }
        }
        // Far too little output, then a prompt, then hang up: the
        // trailing prompt must not count below the floor.
        ws.send(data_frame(&vec![b'y'; SHORT])).await.unwrap();
        ws.send(data_frame(b"\r\nuser@host:~$ ")).await.unwrap();
        ws.close(None).await.unwrap();
    })
    .await;

    let outcome = bench::throughput::run(&config_for(addr)).await;
    match outcome {
        Outcome::Failure(failure) => {
            assert_eq!(failure.error, "timeout or incomplete");
            let partial = failure.total_bytes.expect("partial byte count");
            assert!(partial > SHORT as u64);
            assert!(partial < 50_000);
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

// =============================================================================
// Memory
// =============================================================================

/// Fake process table: RSS climbs by 1 MB per lookup.
struct RisingProbe {
    calls: AtomicU64,
}

impl RssProbe for RisingProbe {
    fn lookup_rss_kb(&self, _name: &str) -> Option<u64> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Some(20 * 1024 + call * 1024)
    }
}

#[tokio::test]
async fn test_memory_reports_rss_growth() {
    const CHUNK: usize = 900_000;

    let (addr, server) = spawn_double(|stream| async move {
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        expect_init(&mut ws).await;
        ws.send(data_frame(b"user@host:~$ ")).await.unwrap();

        loop {
            let msg = ws.next().await.expect("no command").expect("transport");
            if let Message::Binary(data) = msg {
                if data.len() >= 2 && data[0] == DATA {
                    assert!(String::from_utf8_lossy(&data[1..]).contains("xxd"));
                    break;
                }
            }
        }
        let chunk = vec![b'0'; CHUNK];
        for _ in 0..5 {
            ws.send(data_frame(&chunk)).await.unwrap();
        }
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let mut config = config_for(addr).with_sample_interval(Duration::from_millis(10));
    config.timeouts = Timeouts {
        settle: Duration::from_millis(100),
        ..Timeouts::default()
    };

    let probe = Arc::new(RisingProbe {
        calls: AtomicU64::new(0),
    });
    let outcome = bench::memory::run(&config, probe).await;

    match outcome {
        Outcome::Report(BenchReport::Memory {
            initial_rss_mb,
            peak_rss_mb,
            final_rss_mb,
            samples,
        }) => {
            assert_eq!(initial_rss_mb, 20.0);
            assert!(samples > 1, "sampler should tick during the session");
            assert!(peak_rss_mb > initial_rss_mb);
            assert!(final_rss_mb >= initial_rss_mb);
            assert!(peak_rss_mb >= final_rss_mb);
        }
        other => panic!("expected memory report, got {other:?}"),
    }

    server.await.unwrap();
}

#[tokio::test]
async fn test_memory_unreachable_server_still_reduces_samples() {
    // Nothing listens on this socket; the session phase fails outright,
    // but the sampler's readings still produce a memory record.
    let addr: SocketAddr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
        // listener dropped here, port closed
    };

    let config = config_for(addr).with_sample_interval(Duration::from_millis(10));
    let probe = Arc::new(RisingProbe {
        calls: AtomicU64::new(0),
    });

    let outcome = bench::memory::run(&config, probe).await;
    match outcome {
        Outcome::Report(BenchReport::Memory { samples, .. }) => {
            assert!(samples >= 1, "initial probe reading must survive");
        }
        other => panic!("expected memory report from probe samples, got {other:?}"),
    }
}

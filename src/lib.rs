//! # ttybench - Benchmark Harness for WebSocket Pseudo-Terminal Servers
//!
//! `ttybench` measures three independent performance dimensions of a
//! ttyd-compatible terminal server:
//!
//! - **Latency**: keystroke-to-echo round-trip time, reported as
//!   p50/p95/p99/min/max over a fixed probe count
//! - **Throughput**: sustained output rate while the shell floods the
//!   data channel, reported in KB/s
//! - **Memory**: server RSS growth under large-output load, sampled
//!   out-of-band from the OS process table
//!
//! The measurement protocol layer (channel-tag framing, prompt
//! detection, per-benchmark termination rules, and statistical
//! reduction) lives in this crate. The WebSocket transport itself is
//! `tokio-tungstenite`; the terminal server is whatever listens on the
//! other end.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ttybench::{BenchConfig, bench};
//!
//! let config = BenchConfig::default();
//! let outcome = bench::latency::run(&config).await;
//! println!("{}", outcome.to_json());
//! ```

pub mod bench;
pub mod config;
pub mod error;
pub mod protocol;
pub mod report;
pub mod rss;
pub mod session;

pub use config::{BenchConfig, Endpoint, SUBPROTOCOL, Timeouts};
pub use error::{Error, Result};
pub use protocol::{Frame, MatchMode, PromptDetector, SessionInit};
pub use report::{BenchFailure, BenchReport, Outcome};
pub use rss::{PgrepProbe, RssProbe};
pub use session::{Inbound, Session};

//! Configuration for benchmark runs.
//!
//! Defaults reproduce the measurement parameters the harness was tuned
//! with; every knob can be overridden through the builder methods.

use std::time::Duration;

/// WebSocket sub-protocol announced during the connection upgrade.
pub const SUBPROTOCOL: &str = "tty";

/// Target endpoint of the terminal server under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Server hostname or address.
    pub host: String,

    /// Server port.
    ///
    /// Default: 7682
    pub port: u16,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 7682,
        }
    }
}

impl Endpoint {
    /// Create an endpoint from host and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The `ws://` URL of the terminal WebSocket route.
    #[must_use]
    pub fn url(&self) -> String {
        format!("ws://{}:{}/ws", self.host, self.port)
    }
}

/// Per-phase deadlines for a benchmark session.
///
/// Every inbound wait in the harness is bounded by one of these. An
/// expired deadline is local control flow, never a run-aborting error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    /// Bound on the initial wait for a shell prompt after the handshake.
    ///
    /// Expiry is non-fatal; the driver proceeds with its workload.
    /// Default: 10 seconds
    pub readiness: Duration,

    /// Bound on each wait for a keystroke echo (latency driver).
    ///
    /// Expiry drops that iteration's sample.
    /// Default: 2 seconds
    pub echo: Duration,

    /// Per-wait window for the next inbound frame (throughput driver).
    ///
    /// Two consecutive expiries past the byte floor end collection.
    /// Default: 3 seconds
    pub idle: Duration,

    /// Hard deadline on the throughput collection phase as a whole.
    ///
    /// Default: 60 seconds
    pub overall: Duration,

    /// Deadline on the memory driver's output collection phase.
    ///
    /// Default: 15 seconds
    pub collection: Duration,

    /// Settle period after memory collection, before teardown.
    ///
    /// Default: 1 second
    pub settle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            readiness: Duration::from_secs(10),
            echo: Duration::from_secs(2),
            idle: Duration::from_secs(3),
            overall: Duration::from_secs(60),
            collection: Duration::from_secs(15),
            settle: Duration::from_secs(1),
        }
    }
}

/// Benchmark run configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Terminal server endpoint.
    pub endpoint: Endpoint,

    /// Auth token carried in the session handshake.
    ///
    /// Default: empty (the server under test does not require one)
    pub auth_token: String,

    /// Terminal width announced in the session handshake.
    ///
    /// Default: 80
    pub columns: u16,

    /// Terminal height announced in the session handshake.
    ///
    /// Default: 24
    pub rows: u16,

    /// Number of keystroke round-trips attempted by the latency driver.
    ///
    /// Missed echoes reduce the collected count below this.
    /// Default: 50
    pub latency_samples: usize,

    /// Pacing delay between latency iterations, so echoes do not overlap.
    ///
    /// Default: 50 ms
    pub pacing: Duration,

    /// Minimum byte count before the throughput driver may declare
    /// completion.
    ///
    /// Guards against matching prompt characters echoed from the command
    /// line itself.
    /// Default: 50,000
    pub byte_floor: u64,

    /// Cumulative payload bytes after which the memory driver stops
    /// collecting.
    ///
    /// Default: 4,000,000
    pub memory_byte_threshold: u64,

    /// Polling interval of the out-of-band RSS sampler.
    ///
    /// Default: 500 ms
    pub sample_interval: Duration,

    /// Process-name substring identifying the server under test in the
    /// OS process table.
    ///
    /// Default: `rust-terminal`
    pub process_name: String,

    /// Maximum inbound WebSocket message size.
    ///
    /// Terminal bursts during the throughput and memory runs reach
    /// multiple megabytes per message.
    /// Default: 20 MB
    pub max_message_size: usize,

    /// Per-phase deadlines.
    pub timeouts: Timeouts,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            auth_token: String::new(),
            columns: 80,
            rows: 24,
            latency_samples: 50,
            pacing: Duration::from_millis(50),
            byte_floor: 50_000,
            memory_byte_threshold: 4_000_000,
            sample_interval: Duration::from_millis(500),
            process_name: "rust-terminal".to_string(),
            max_message_size: 20 * 1024 * 1024, // 20 MB
            timeouts: Timeouts::default(),
        }
    }
}

impl BenchConfig {
    /// Create a configuration with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the latency sample count.
    #[must_use]
    pub const fn with_latency_samples(mut self, samples: usize) -> Self {
        self.latency_samples = samples;
        self
    }

    /// Set the pacing delay between latency iterations.
    #[must_use]
    pub const fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Set the completion byte floor.
    #[must_use]
    pub const fn with_byte_floor(mut self, floor: u64) -> Self {
        self.byte_floor = floor;
        self
    }

    /// Set the RSS sampler polling interval.
    #[must_use]
    pub const fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Set the process-name substring used by the RSS sampler.
    #[must_use]
    pub fn with_process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = name.into();
        self
    }

    /// Set the per-phase deadlines.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

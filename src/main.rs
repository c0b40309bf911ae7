//! Command-line entry point: run one benchmark, print one JSON record.

use std::sync::Arc;

use clap::{Parser, ValueEnum};

use ttybench::rss::PgrepProbe;
use ttybench::{BenchConfig, Endpoint, bench};

#[derive(Parser, Debug)]
#[command(
    name = "ttybench",
    version,
    about = "Benchmark harness for WebSocket pseudo-terminal servers"
)]
struct Cli {
    /// Which benchmark to run
    #[arg(value_enum)]
    benchmark: Benchmark,

    /// Terminal server host
    #[arg(long, default_value = "localhost", env = "TTYBENCH_HOST")]
    host: String,

    /// Terminal server port
    #[arg(short, long, default_value = "7682", env = "TTYBENCH_PORT")]
    port: u16,

    /// Process-name substring the memory benchmark samples RSS for
    #[arg(long, default_value = "rust-terminal")]
    process_name: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Benchmark {
    /// Keystroke-to-echo round-trip latency
    Latency,
    /// Sustained output throughput
    Throughput,
    /// Server RSS growth under load
    Memory,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = BenchConfig::new()
        .with_endpoint(Endpoint::new(cli.host, cli.port))
        .with_process_name(cli.process_name);

    let outcome = match cli.benchmark {
        Benchmark::Latency => bench::latency::run(&config).await,
        Benchmark::Throughput => bench::throughput::run(&config).await,
        Benchmark::Memory => bench::memory::run(&config, Arc::new(PgrepProbe)).await,
    };

    // The record is the program's entire output contract: exactly one
    // JSON object on stdout, success or failure alike.
    println!("{}", outcome.to_json());
}

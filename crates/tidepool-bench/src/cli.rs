//! tidepool-bench - compare per-operation connections against a pool
//!
//! Usage:
//!   tidepool-bench                                   # both modes, defaults
//!   tidepool-bench --mode pooled --max-size 10
//!   tidepool-bench --config bench.toml --format json
//!   tidepool-bench --failure-rate 0.05 --retries 2

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tidepool::{BackoffStrategy, RetryConfig};
use tidepool_bench::logging::{self, LogFormat};
use tidepool_bench::{BenchConfig, BenchMode, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "tidepool-bench",
    version,
    about = "Measure naive connect-per-operation against a connection pool"
)]
struct Cli {
    /// TOML file with benchmark settings; flags below override it
    #[arg(long, short, env = "TIDEPOOL_BENCH_CONFIG")]
    config: Option<PathBuf>,

    /// Which strategies to run
    #[arg(long, value_enum)]
    mode: Option<BenchMode>,

    /// Concurrent operations per run
    #[arg(long, short = 'n')]
    operations: Option<usize>,

    /// Pool capacity for the pooled run
    #[arg(long)]
    max_size: Option<usize>,

    /// Simulated connection setup time
    #[arg(long)]
    connect_latency_ms: Option<u64>,

    /// Simulated query time
    #[arg(long)]
    query_latency_ms: Option<u64>,

    /// Probability that a connect is refused
    #[arg(long)]
    failure_rate: Option<f64>,

    /// Retry refused connects in the pooled run this many times
    #[arg(long)]
    retries: Option<u32>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "TIDEPOOL_LOG_FORMAT")]
    log_format: LogFormat,
}

impl Cli {
    /// Defaults, then the config file, then flags
    fn load_config(&self) -> anyhow::Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::from_file(path)?,
            None => BenchConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(operations) = self.operations {
            config.operations = operations;
        }
        if let Some(max_size) = self.max_size {
            if max_size == 0 {
                anyhow::bail!("--max-size must be greater than 0");
            }
            config.pool = config.pool.with_max_size(max_size);
        }
        if let Some(latency) = self.connect_latency_ms {
            config.simulation.connect_latency_ms = latency;
        }
        if let Some(latency) = self.query_latency_ms {
            config.simulation.query_latency_ms = latency;
        }
        if let Some(rate) = self.failure_rate {
            config.simulation.failure_rate = rate;
        }
        if let Some(retries) = self.retries {
            let backoff = config
                .retry
                .as_ref()
                .map(|retry| retry.backoff().clone())
                .unwrap_or_else(|| BackoffStrategy::new(10, 1_000).with_jitter(true));
            config.retry = Some(RetryConfig::new(retries, backoff));
        }

        config.validate().context("Invalid benchmark settings")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format, logging::DEFAULT_FILTER)?;

    let config = cli.load_config()?;
    tracing::info!(
        mode = ?config.mode,
        operations = config.operations,
        max_size = config.pool.max_size(),
        "starting benchmark"
    );

    let report = tidepool_bench::run(&config).await?;
    println!("{}", report.render(cli.format)?);
    Ok(())
}

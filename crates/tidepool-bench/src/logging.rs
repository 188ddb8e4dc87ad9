//! Tracing subscriber setup for the benchmark binary
//!
//! Logs go to stderr so a JSON report on stdout stays machine-readable.
//! `RUST_LOG` takes precedence over the default filter.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn,tidepool=info,tidepool_bench=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable, colored
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Install the global subscriber
pub fn init(format: LogFormat, default_filter: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let layer = match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_ansi(true)
            .pretty()
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .context("Logging already initialized")?;

    tracing::debug!(?format, "logging initialized");
    Ok(())
}

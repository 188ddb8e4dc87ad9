//! Benchmark configuration
//!
//! Loaded from an optional TOML file; command line flags override it.
//!
//! ```toml
//! operations = 100
//! mode = "both"
//!
//! [pool]
//! max_size = 100
//!
//! [connect]
//! host = "localhost"
//! database = "test"
//!
//! [simulation]
//! connect_latency_ms = 20
//! failure_rate = 0.01
//!
//! [retry]
//! max_attempts = 2
//! ```

use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use tidepool::{ConnectParams, PoolConfig, RetryConfig};

use crate::simulated::SimulationConfig;

/// Which strategies to measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BenchMode {
    /// Open and close a connection per operation
    Naive,
    /// Borrow connections from a pool
    Pooled,
    #[default]
    Both,
}

impl BenchMode {
    pub fn runs_naive(self) -> bool {
        matches!(self, BenchMode::Naive | BenchMode::Both)
    }

    pub fn runs_pooled(self) -> bool {
        matches!(self, BenchMode::Pooled | BenchMode::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Concurrent operations per run
    pub operations: usize,
    pub mode: BenchMode,
    /// Query each operation runs
    pub query: String,
    pub pool: PoolConfig,
    pub connect: ConnectParams,
    pub simulation: SimulationConfig,
    /// Retry refused connects in the pooled run
    pub retry: Option<RetryConfig>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            operations: 100,
            mode: BenchMode::Both,
            query: "SELECT NOW()".to_string(),
            pool: PoolConfig::new(0, 100),
            connect: ConnectParams::postgres("localhost", 5432, "test", "test")
                .with_password("test"),
            simulation: SimulationConfig::default(),
            retry: None,
        }
    }
}

impl BenchConfig {
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(source).context("Invalid benchmark config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.operations == 0 {
            bail!("operations must be greater than 0");
        }
        if !(0.0..=1.0).contains(&self.simulation.failure_rate) {
            bail!(
                "failure_rate must be between 0 and 1, got {}",
                self.simulation.failure_rate
            );
        }
        self.pool.validate()?;
        Ok(())
    }
}

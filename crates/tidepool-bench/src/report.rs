//! Benchmark results and their rendering

use std::fmt;
use std::time::Duration;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use tidepool::PoolStats;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Outcome of one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: String,
    pub operations: usize,
    pub elapsed_ms: f64,
    pub ops_per_sec: f64,
    /// Connections the server saw opened
    pub connections_opened: usize,
    /// Operations that ended in an error
    pub failures: usize,
    /// Pool counters after the last operation, for pooled runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolStats>,
}

impl RunReport {
    pub fn new(
        mode: &str,
        operations: usize,
        elapsed: Duration,
        connections_opened: usize,
        failures: usize,
    ) -> Self {
        let secs = elapsed.as_secs_f64();
        let ops_per_sec = if secs > 0.0 {
            operations as f64 / secs
        } else {
            0.0
        };
        Self {
            mode: mode.to_string(),
            operations,
            elapsed_ms: secs * 1000.0,
            ops_per_sec,
            connections_opened,
            failures,
            pool: None,
        }
    }

    pub fn with_pool_stats(mut self, stats: PoolStats) -> Self {
        self.pool = Some(stats);
        self
    }

    pub fn succeeded(&self) -> usize {
        self.operations - self.failures
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchReport {
    pub runs: Vec<RunReport>,
}

impl BenchReport {
    pub fn push(&mut self, run: RunReport) {
        self.runs.push(run);
    }

    pub fn run(&self, mode: &str) -> Option<&RunReport> {
        self.runs.iter().find(|r| r.mode == mode)
    }

    /// Pooled throughput relative to naive, when both ran
    pub fn speedup(&self) -> Option<f64> {
        let naive = self.run("naive")?;
        let pooled = self.run("pooled")?;
        (naive.ops_per_sec > 0.0).then(|| pooled.ops_per_sec / naive.ops_per_sec)
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Mode",
                "Operations",
                "Elapsed (ms)",
                "Ops/sec",
                "Connections",
                "Failures",
            ]);

        for run in &self.runs {
            table.add_row(vec![
                Cell::new(&run.mode),
                Cell::new(run.operations),
                Cell::new(format!("{:.1}", run.elapsed_ms)),
                Cell::new(format!("{:.1}", run.ops_per_sec)),
                Cell::new(run.connections_opened),
                Cell::new(run.failures),
            ]);
        }
        table
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        Ok(match format {
            OutputFormat::Table => self.to_string(),
            OutputFormat::Json => self.to_json()?,
        })
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())?;
        if let Some(speedup) = self.speedup() {
            write!(f, "\npooled is {:.2}x the naive throughput", speedup)?;
        }
        Ok(())
    }
}

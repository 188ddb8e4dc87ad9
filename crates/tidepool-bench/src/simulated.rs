//! In-process stand-in for a database server

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tidepool_core::{ConnectParams, Connector, Result, TidepoolError};

/// Latencies and failure rate of the simulated server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Time to establish one connection (handshake plus auth)
    pub connect_latency_ms: u64,
    /// Time to run one query
    pub query_latency_ms: u64,
    /// Probability in `[0, 1]` that a connect is refused
    pub failure_rate: f64,
}

impl SimulationConfig {
    pub fn connect_latency(&self) -> Duration {
        Duration::from_millis(self.connect_latency_ms)
    }

    pub fn query_latency(&self) -> Duration {
        Duration::from_millis(self.query_latency_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            connect_latency_ms: 20,
            query_latency_ms: 2,
            failure_rate: 0.0,
        }
    }
}

/// A connection to the simulated server
#[derive(Debug)]
pub struct SimulatedConnection {
    id: u64,
    query_latency: Duration,
    queries: u64,
}

impl SimulatedConnection {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queries run on this connection so far
    pub fn queries(&self) -> u64 {
        self.queries
    }

    /// Run `sql`, taking the configured query latency
    pub async fn query(&mut self, sql: &str) -> Result<()> {
        if sql.trim().is_empty() {
            return Err(TidepoolError::Other("empty query".into()));
        }
        tokio::time::sleep(self.query_latency).await;
        self.queries += 1;
        tracing::trace!(connection_id = self.id, sql, "query finished");
        Ok(())
    }
}

/// Connector for the simulated server; counts what it was asked to do
#[derive(Debug, Default)]
pub struct SimulatedConnector {
    config: SimulationConfig,
    next_id: AtomicU64,
    connects: AtomicUsize,
    refused: AtomicUsize,
    teardowns: AtomicUsize,
}

impl SimulatedConnector {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Connections successfully opened
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Connect attempts that were refused
    pub fn refused(&self) -> usize {
        self.refused.load(Ordering::SeqCst)
    }

    pub fn teardowns(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    fn roll_failure(&self) -> bool {
        let rate = self.config.failure_rate.clamp(0.0, 1.0);
        rate > 0.0 && rand::thread_rng().gen_bool(rate)
    }
}

#[async_trait]
impl Connector for SimulatedConnector {
    type Connection = SimulatedConnection;

    async fn connect(&self, params: &ConnectParams) -> Result<SimulatedConnection> {
        tokio::time::sleep(self.config.connect_latency()).await;

        if self.roll_failure() {
            self.refused.fetch_add(1, Ordering::SeqCst);
            return Err(TidepoolError::Connect(format!(
                "connection to {} refused",
                params.address()
            )));
        }

        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(SimulatedConnection {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            query_latency: self.config.query_latency(),
            queries: 0,
        })
    }

    async fn teardown(&self, _conn: SimulatedConnection) -> Result<()> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

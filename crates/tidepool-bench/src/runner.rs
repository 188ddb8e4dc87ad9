//! The two strategies being compared
//!
//! Every operation is spawned as its own task and all of them are joined, so
//! the elapsed time covers the full batch and no error goes unobserved.

use std::sync::Arc;

use anyhow::Context;
use futures::future::try_join_all;
use tidepool::{ConnectionPool, Connector, RetryingConnector};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::BenchConfig;
use crate::report::{BenchReport, RunReport};
use crate::simulated::{SimulatedConnection, SimulatedConnector};

/// Run every strategy `config.mode` selects, each against a fresh server
pub async fn run(config: &BenchConfig) -> anyhow::Result<BenchReport> {
    config.validate()?;
    let mut report = BenchReport::default();

    if config.mode.runs_naive() {
        let server = Arc::new(SimulatedConnector::new(config.simulation.clone()));
        report.push(run_naive(server, config).await?);
    }
    if config.mode.runs_pooled() {
        let server = Arc::new(SimulatedConnector::new(config.simulation.clone()));
        report.push(run_pooled(server, config).await?);
    }
    Ok(report)
}

/// Connect, query and disconnect once per operation
#[tracing::instrument(skip_all, fields(operations = config.operations))]
pub async fn run_naive(
    server: Arc<SimulatedConnector>,
    config: &BenchConfig,
) -> anyhow::Result<RunReport> {
    let opened_before = server.connects();
    let started = Instant::now();

    let tasks = (0..config.operations).map(|_| {
        let server = Arc::clone(&server);
        let params = config.connect.clone();
        let query = config.query.clone();
        tokio::spawn(async move {
            let mut conn = server.connect(&params).await?;
            let result = conn.query(&query).await;
            server.teardown(conn).await?;
            result
        })
    });
    let failures = join_operations(tasks).await?;

    let report = RunReport::new(
        "naive",
        config.operations,
        started.elapsed(),
        server.connects() - opened_before,
        failures,
    );
    tracing::info!(
        elapsed_ms = report.elapsed_ms,
        connections = report.connections_opened,
        failures,
        "naive run finished"
    );
    Ok(report)
}

/// Borrow a pooled connection per operation, retrying refused connects
/// when `config.retry` is set
pub async fn run_pooled(
    server: Arc<SimulatedConnector>,
    config: &BenchConfig,
) -> anyhow::Result<RunReport> {
    match &config.retry {
        Some(retry) => {
            let connector = RetryingConnector::new(Arc::clone(&server), retry.clone());
            pooled(connector, &server, config).await
        }
        None => pooled(Arc::clone(&server), &server, config).await,
    }
}

#[tracing::instrument(
    skip_all,
    fields(operations = config.operations, max_size = config.pool.max_size())
)]
async fn pooled<C>(
    connector: C,
    server: &SimulatedConnector,
    config: &BenchConfig,
) -> anyhow::Result<RunReport>
where
    C: Connector<Connection = SimulatedConnection>,
{
    let opened_before = server.connects();
    let pool = ConnectionPool::new(config.pool.clone(), config.connect.clone(), connector);
    pool.warm_up().await.context("Failed to warm up pool")?;
    let maintenance = pool.spawn_maintenance();

    let started = Instant::now();
    let tasks = (0..config.operations).map(|_| {
        let pool = pool.clone();
        let query = config.query.clone();
        tokio::spawn(async move {
            let mut conn = pool.acquire().await?;
            let result = conn.query(&query).await;
            if result.is_err() {
                conn.mark_unhealthy();
            }
            result
        })
    });
    let failures = join_operations(tasks).await?;
    let elapsed = started.elapsed();

    let stats = pool.stats();
    pool.close().await;
    if let Some(task) = maintenance {
        task.abort();
    }

    let report = RunReport::new(
        "pooled",
        config.operations,
        elapsed,
        server.connects() - opened_before,
        failures,
    )
    .with_pool_stats(stats);
    tracing::info!(
        elapsed_ms = report.elapsed_ms,
        connections = report.connections_opened,
        failures,
        "pooled run finished"
    );
    Ok(report)
}

/// Wait for every operation; returns how many failed
async fn join_operations<I>(tasks: I) -> anyhow::Result<usize>
where
    I: IntoIterator<Item = JoinHandle<tidepool::Result<()>>>,
{
    let outcomes = try_join_all(tasks)
        .await
        .context("Benchmark operation panicked")?;

    let mut failures = 0;
    for error in outcomes.into_iter().filter_map(Result::err) {
        if failures == 0 {
            tracing::warn!(error = %error, "operation failed");
        }
        failures += 1;
    }
    Ok(failures)
}

//! Tests for connection pool functionality

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tidepool_core::{ConnectParams, Connector, Result, TidepoolError};

use super::config::PoolConfig;
use super::handle::{ConnectionHandle, HandleState};
use super::pool::ConnectionPool;
use super::stats::PoolStats;
use crate::health::HealthStatus;

/// Mock connection for testing
#[derive(Debug)]
struct MockConnection {
    id: usize,
}

/// Mock connector that counts connections opened and torn down
#[derive(Default)]
struct MockConnector {
    opened: AtomicUsize,
    closed: AtomicUsize,
    /// Number of upcoming connect calls that fail
    failures: AtomicUsize,
    /// Fail every ping
    pings_fail: AtomicBool,
    /// Connections whose ping fails
    dead: Mutex<HashSet<usize>>,
}

impl MockConnector {
    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    fn kill(&self, id: usize) {
        self.dead.lock().insert(id);
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self, _params: &ConnectParams) -> Result<MockConnection> {
        let refused = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(TidepoolError::Connect("connection refused".into()));
        }
        let id = self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection { id })
    }

    async fn teardown(&self, _conn: MockConnection) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ping(&self, conn: &mut MockConnection) -> Result<()> {
        if self.pings_fail.load(Ordering::SeqCst) || self.dead.lock().contains(&conn.id) {
            return Err(TidepoolError::Connect(
                "server closed the connection unexpectedly".into(),
            ));
        }
        Ok(())
    }
}

fn pool_with(config: PoolConfig) -> (ConnectionPool<Arc<MockConnector>>, Arc<MockConnector>) {
    let connector = Arc::new(MockConnector::default());
    let params = ConnectParams::postgres("127.0.0.1", 5432, "test", "test");
    (ConnectionPool::new(config, params, connector.clone()), connector)
}

/// Let spawned teardown tasks run
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn wait_for_waiters(pool: &ConnectionPool<Arc<MockConnector>>, count: usize) {
    while pool.stats().waiting() < count {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// PoolConfig tests
// =============================================================================

#[test]
fn test_pool_config_creation() {
    let config = PoolConfig::new(2, 10);
    assert_eq!(config.min_size(), 2);
    assert_eq!(config.max_size(), 10);
    assert_eq!(config.acquire_timeout(), Duration::from_millis(30_000));
    assert_eq!(config.idle_timeout(), Duration::from_millis(600_000));
    assert!(config.max_lifetime().is_none());
    assert!(config.test_on_checkout());
    assert_eq!(config.validation_retries(), 1);
    assert!(config.reap_interval().is_none());
}

#[test]
fn test_pool_config_builders() {
    let config = PoolConfig::new(1, 5)
        .with_max_size(7)
        .with_acquire_timeout_ms(5000)
        .with_idle_timeout_ms(60000)
        .with_max_lifetime_ms(3600000)
        .with_test_on_checkout(false)
        .with_validation_timeout_ms(250)
        .with_validation_retries(3)
        .with_reap_interval_ms(1000)
        .with_health_thresholds_ms(10, 50);

    assert_eq!(config.max_size(), 7);
    assert_eq!(config.acquire_timeout(), Duration::from_millis(5000));
    assert_eq!(config.idle_timeout(), Duration::from_millis(60000));
    assert_eq!(config.max_lifetime(), Some(Duration::from_millis(3600000)));
    assert!(!config.test_on_checkout());
    assert_eq!(config.validation_timeout(), Duration::from_millis(250));
    assert_eq!(config.validation_retries(), 3);
    assert_eq!(config.reap_interval(), Some(Duration::from_secs(1)));
    assert_eq!(
        config.health_thresholds().degraded_threshold,
        Duration::from_millis(50)
    );
}

#[test]
fn test_pool_config_default() {
    let config = PoolConfig::default();
    assert_eq!(config.min_size(), 0);
    assert_eq!(config.max_size(), 10);
}

#[test]
#[should_panic(expected = "max_size must be greater than 0")]
fn test_pool_config_invalid_max_size() {
    PoolConfig::new(0, 0);
}

#[test]
#[should_panic(expected = "min_size (10) cannot exceed max_size (5)")]
fn test_pool_config_min_exceeds_max() {
    PoolConfig::new(10, 5);
}

#[test]
fn test_pool_config_json_roundtrip() {
    let config = PoolConfig::new(2, 10)
        .with_acquire_timeout_ms(5000)
        .with_max_lifetime_ms(3600000);

    let json = serde_json::to_string(&config).expect("serialize");
    let deserialized = PoolConfig::from_json_str(&json).expect("deserialize");
    assert_eq!(deserialized, config);
}

#[test]
fn test_pool_config_from_toml_fills_defaults() {
    let config = PoolConfig::from_toml_str(
        r#"
        max_size = 100
        acquire_timeout_ms = 2000
        reap_interval_ms = 30000
        "#,
    )
    .expect("parse");

    assert_eq!(config.max_size(), 100);
    assert_eq!(config.min_size(), 0);
    assert_eq!(config.acquire_timeout(), Duration::from_secs(2));
    assert_eq!(config.idle_timeout(), Duration::from_secs(600));
    assert_eq!(config.reap_interval(), Some(Duration::from_secs(30)));
}

#[rstest]
#[case::zero_max("max_size = 0", "max_size must be greater than 0")]
#[case::min_over_max("min_size = 4\nmax_size = 2", "cannot exceed max_size")]
#[case::zero_reap("reap_interval_ms = 0", "reap_interval_ms")]
fn test_pool_config_rejects_invalid_toml(#[case] source: &str, #[case] message: &str) {
    let err = PoolConfig::from_toml_str(source).unwrap_err();
    assert!(matches!(err, TidepoolError::Configuration(_)));
    assert!(err.to_string().contains(message), "unexpected error: {}", err);
}

#[test]
fn test_pool_config_from_file() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("tidepool-config-{}.toml", std::process::id()));
    std::fs::write(&path, "max_size = 3\nidle_timeout_ms = 1000\n")?;

    let config = PoolConfig::from_file(&path).context("Failed to load config file")?;
    std::fs::remove_file(&path)?;

    assert_eq!(config.max_size(), 3);
    assert_eq!(config.idle_timeout(), Duration::from_secs(1));
    Ok(())
}

// =============================================================================
// PoolStats tests
// =============================================================================

#[test]
fn test_pool_stats_creation() {
    let stats = PoolStats::new(10, 6, 2, 20);
    assert_eq!(stats.total(), 10);
    assert_eq!(stats.idle(), 6);
    assert_eq!(stats.active(), 4);
    assert_eq!(stats.waiting(), 2);
    assert_eq!(stats.max_size(), 20);
    assert_eq!(stats.available(), 16);
}

#[test]
fn test_pool_stats_utilization() {
    let stats = PoolStats::new(10, 5, 0, 10);
    assert!((stats.utilization() - 0.5).abs() < 0.001);

    let full = PoolStats::new(10, 0, 3, 10);
    assert!((full.utilization() - 1.0).abs() < 0.001);
    assert!(full.is_saturated());

    let empty = PoolStats::default();
    assert!((empty.utilization() - 0.0).abs() < 0.001);
    assert!(!empty.is_saturated());
}

#[test]
fn test_pool_stats_not_saturated_with_spare_capacity() {
    let stats = PoolStats::new(4, 0, 0, 5);
    assert!(!stats.is_saturated());
    assert_eq!(stats.available(), 1);
}

#[test]
fn test_pool_stats_serialization() {
    let stats = PoolStats::new(10, 6, 2, 10);
    let json = serde_json::to_string(&stats).expect("serialize");
    let deserialized: PoolStats = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(stats, deserialized);
}

// =============================================================================
// ConnectionHandle tests
// =============================================================================

#[tokio::test]
async fn test_handle_close_is_idempotent() {
    let connector = MockConnector::default();
    let mut handle = ConnectionHandle::new(7, MockConnection { id: 0 });
    assert_eq!(handle.state(), HandleState::InUse);
    assert!(handle.is_healthy());

    handle.close(&connector).await.unwrap();
    handle.close(&connector).await.unwrap();

    assert_eq!(connector.closed(), 1);
    assert!(handle.is_closed());
    assert!(!handle.is_healthy());
    assert!(handle.connection().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_handle_tracks_use_and_age() {
    let mut handle = ConnectionHandle::new(1, MockConnection { id: 0 });
    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(handle.idle_for(), Duration::from_secs(5));

    handle.mark_used();
    assert_eq!(handle.idle_for(), Duration::ZERO);
    assert_eq!(handle.age(), Duration::from_secs(5));
    assert!(handle.is_expired(Some(Duration::from_secs(4))));
    assert!(!handle.is_expired(None));
}

#[test]
fn test_handle_mark_unhealthy() {
    let mut handle = ConnectionHandle::new(1, MockConnection { id: 0 });
    handle.mark_unhealthy();
    assert!(!handle.is_healthy());
    assert_eq!(handle.last_status(), HealthStatus::Healthy);
}

// =============================================================================
// ConnectionPool tests
// =============================================================================

#[tokio::test]
async fn test_pool_acquire_opens_connection() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 5));

    let conn = pool.acquire().await.expect("acquire");
    assert_eq!(conn.handle().state(), HandleState::InUse);
    assert_eq!(connector.opened(), 1);

    let stats = pool.stats();
    assert_eq!(stats.total(), 1);
    assert_eq!(stats.active(), 1);
    assert_eq!(stats.idle(), 0);
}

#[tokio::test]
async fn test_pool_connection_return_and_reuse() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 5));

    let first_id = {
        let conn = pool.acquire().await.expect("acquire");
        conn.id()
    };

    assert_eq!(pool.stats().active(), 0);
    assert_eq!(pool.stats().idle(), 1);

    let conn = pool.acquire().await.expect("acquire");
    assert_eq!(conn.id(), first_id);
    assert_eq!(connector.opened(), 1);

    pool.release(conn);
    assert_eq!(pool.stats().idle(), 1);
}

#[tokio::test]
async fn test_pool_idle_reuse_is_lifo() {
    let (pool, _connector) = pool_with(PoolConfig::new(0, 5));

    let h1 = pool.acquire().await.expect("acquire h1");
    let h2 = pool.acquire().await.expect("acquire h2");
    let h2_id = h2.id();

    h1.release();
    h2.release();

    let next = pool.acquire().await.expect("acquire");
    assert_eq!(next.id(), h2_id);
}

#[tokio::test]
async fn test_pool_times_out_when_saturated() {
    let config = PoolConfig::new(0, 2).with_acquire_timeout_ms(100);
    let (pool, connector) = pool_with(config);

    let _conn1 = pool.acquire().await.expect("acquire 1");
    let _conn2 = pool.acquire().await.expect("acquire 2");

    let err = pool.acquire().await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {}", err);
    assert!(err.to_string().contains("Timed out"));

    assert_eq!(pool.stats().waiting(), 0);
    assert_eq!(connector.opened(), 2);
}

#[tokio::test]
async fn test_pool_third_caller_receives_released_handle() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 2));

    let c1 = pool.acquire_with_deadline(None).await.expect("c1");
    let c2 = pool.acquire_with_deadline(None).await.expect("c2");
    assert_eq!(connector.opened(), 2);
    let c1_id = c1.id();

    let c3 = tokio::spawn({
        let pool = pool.clone();
        async move { pool.acquire_with_deadline(None).await }
    });
    wait_for_waiters(&pool, 1).await;
    assert_eq!(pool.stats().total(), 2);

    drop(c1);
    let c3 = c3.await.expect("join").expect("c3");

    assert_eq!(c3.id(), c1_id);
    assert_eq!(c3.handle().state(), HandleState::InUse);
    assert_eq!(pool.stats().total(), 2);
    assert_eq!(pool.stats().idle(), 0);
    assert_eq!(connector.opened(), 2);
    drop(c2);
}

#[tokio::test]
async fn test_pool_waiters_served_in_fifo_order() {
    let (pool, _connector) = pool_with(PoolConfig::new(0, 1));
    let held = pool.acquire().await.expect("acquire");
    let held_id = held.id();
    let served = Arc::new(Mutex::new(Vec::new()));

    let mut tasks = Vec::new();
    for index in 0..4 {
        let task_pool = pool.clone();
        let served = served.clone();
        tasks.push(tokio::spawn(async move {
            let conn = task_pool.acquire_with_deadline(None).await.expect("acquire");
            served.lock().push((index, conn.id()));
        }));
        wait_for_waiters(&pool, index + 1).await;
    }

    drop(held);
    for task in tasks {
        task.await.expect("join");
    }

    let served = served.lock().clone();
    assert_eq!(
        served,
        vec![(0, held_id), (1, held_id), (2, held_id), (3, held_id)]
    );
}

#[tokio::test]
async fn test_pool_connect_failure_releases_reservation() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 2));
    connector.fail_next(1);

    let err = pool.acquire().await.unwrap_err();
    assert!(err.is_connect());
    assert_eq!(pool.stats().total(), 0);
    assert_eq!(connector.opened(), 0);

    let conn = pool.acquire().await.expect("second acquire");
    assert_eq!(conn.id, 0);
    assert_eq!(pool.stats().total(), 1);
}

#[tokio::test]
async fn test_pool_connect_failure_is_not_retried() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 2));
    connector.fail_next(2);

    assert!(pool.acquire().await.unwrap_err().is_connect());
    // each acquire made exactly one connect attempt
    assert!(pool.acquire().await.unwrap_err().is_connect());
    assert!(pool.acquire().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_evict_idle_only_closes_stale_connections() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 5));

    let old = pool.acquire().await.expect("acquire old");
    let fresh = pool.acquire().await.expect("acquire fresh");
    let fresh_id = fresh.id();

    drop(old);
    tokio::time::advance(Duration::from_secs(60)).await;
    drop(fresh);
    tokio::time::advance(Duration::from_secs(10)).await;

    let evicted = pool.evict_idle(Duration::from_secs(30)).await;
    assert_eq!(evicted, 1);
    assert_eq!(connector.closed(), 1);
    assert_eq!(pool.stats().total(), 1);
    assert_eq!(pool.stats().idle(), 1);

    let conn = pool.acquire().await.expect("acquire");
    assert_eq!(conn.id(), fresh_id);
}

#[tokio::test(start_paused = true)]
async fn test_evict_idle_respects_max_lifetime() {
    let config = PoolConfig::new(0, 5).with_max_lifetime_ms(1_000);
    let (pool, connector) = pool_with(config);

    drop(pool.acquire().await.expect("acquire"));
    tokio::time::advance(Duration::from_secs(2)).await;

    assert_eq!(pool.evict_idle(Duration::from_secs(3600)).await, 1);
    assert_eq!(connector.closed(), 1);
    assert_eq!(pool.stats().total(), 0);
}

#[tokio::test]
async fn test_close_rejects_waiters_and_stops_connecting() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 1));
    let held = pool.acquire().await.expect("acquire");

    let waiter = tokio::spawn({
        let pool = pool.clone();
        async move { pool.acquire_with_deadline(None).await }
    });
    wait_for_waiters(&pool, 1).await;

    pool.close().await;
    let result = waiter.await.expect("join");
    assert!(result.unwrap_err().is_pool_closed());

    assert!(pool.acquire().await.unwrap_err().is_pool_closed());
    assert!(pool.is_closed());
    assert_eq!(connector.opened(), 1);

    // checked-out connections are closed when they come back
    drop(held);
    settle().await;
    assert_eq!(connector.closed(), 1);
    assert_eq!(pool.stats().total(), 0);
}

#[tokio::test]
async fn test_close_is_idempotent_and_closes_idle() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 3));
    let a = pool.acquire().await.expect("a");
    let b = pool.acquire().await.expect("b");
    drop(a);
    drop(b);

    pool.close().await;
    pool.close().await;

    assert_eq!(connector.closed(), 2);
    assert_eq!(pool.stats().total(), 0);
    assert_eq!(pool.stats().idle(), 0);
}

#[tokio::test]
async fn test_failed_validation_discards_and_retries() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 2));

    drop(pool.acquire().await.expect("acquire"));
    connector.kill(0);

    let conn = pool.acquire().await.expect("acquire after stale");
    assert_eq!(conn.id, 1);
    assert_eq!(connector.opened(), 2);
    assert_eq!(connector.closed(), 1);
    assert_eq!(pool.stats().total(), 1);
}

#[tokio::test]
async fn test_repeated_validation_failure_surfaces_connect_error() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 3));
    let conns = vec![
        pool.acquire().await.expect("a"),
        pool.acquire().await.expect("b"),
        pool.acquire().await.expect("c"),
    ];
    drop(conns);
    connector.pings_fail.store(true, Ordering::SeqCst);

    let err = pool.acquire().await.unwrap_err();
    assert!(err.is_connect(), "expected connect error, got {}", err);
    assert_eq!(connector.closed(), 2);
    assert_eq!(pool.stats().total(), 1);
}

#[tokio::test]
async fn test_validation_skipped_when_disabled() {
    let config = PoolConfig::new(0, 2).with_test_on_checkout(false);
    let (pool, connector) = pool_with(config);

    drop(pool.acquire().await.expect("acquire"));
    connector.kill(0);

    let conn = pool.acquire().await.expect("acquire");
    assert_eq!(conn.id, 0);
    assert_eq!(connector.opened(), 1);
}

#[tokio::test]
async fn test_unhealthy_connection_is_closed_on_release() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 2));

    let mut conn = pool.acquire().await.expect("acquire");
    conn.mark_unhealthy();
    drop(conn);
    settle().await;

    assert_eq!(connector.closed(), 1);
    assert_eq!(pool.stats().total(), 0);
    assert_eq!(pool.stats().idle(), 0);
}

#[tokio::test]
async fn test_cancelled_waiter_leaves_queue() {
    let (pool, _connector) = pool_with(PoolConfig::new(0, 1));
    let held = pool.acquire().await.expect("acquire");

    let attempt =
        tokio::time::timeout(Duration::from_millis(20), pool.acquire_with_deadline(None)).await;
    assert!(attempt.is_err());
    assert_eq!(pool.stats().waiting(), 0);

    drop(held);
    assert_eq!(pool.stats().idle(), 1);
    assert_eq!(pool.stats().total(), 1);
}

#[tokio::test]
async fn test_waiter_inherits_slot_when_connection_closed() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 1));
    let held = pool.acquire().await.expect("acquire");

    let waiter = tokio::spawn({
        let pool = pool.clone();
        async move { pool.acquire_with_deadline(None).await }
    });
    wait_for_waiters(&pool, 1).await;

    held.close().await.expect("close");
    let conn = waiter.await.expect("join").expect("waiter");

    assert_eq!(conn.id, 1);
    assert_eq!(connector.opened(), 2);
    assert_eq!(pool.stats().total(), 1);
}

#[tokio::test]
async fn test_waiter_surfaces_connect_error_on_inherited_slot() {
    let (pool, connector) = pool_with(PoolConfig::new(0, 1));
    let held = pool.acquire().await.expect("acquire");

    let waiter = tokio::spawn({
        let pool = pool.clone();
        async move { pool.acquire_with_deadline(None).await }
    });
    wait_for_waiters(&pool, 1).await;

    connector.fail_next(1);
    held.close().await.expect("close");

    let err = waiter.await.expect("join").unwrap_err();
    assert!(err.is_connect());
    assert_eq!(pool.stats().total(), 0);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_active_never_exceeds_max_size(#[case] max_size: usize) {
    let (pool, connector) = pool_with(PoolConfig::new(0, max_size));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let tasks = (0..40).map(|_| {
        let pool = pool.clone();
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        tokio::spawn(async move {
            let conn = pool.acquire_with_deadline(None).await?;
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            assert!(pool.stats().total() <= max_size);
            tokio::time::sleep(Duration::from_millis(1)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            drop(conn);
            Ok::<_, TidepoolError>(())
        })
    });

    for result in futures::future::join_all(tasks).await {
        result.expect("join").expect("acquire");
    }

    assert!(peak.load(Ordering::SeqCst) <= max_size);
    assert!(connector.opened() <= max_size);
    assert_eq!(pool.stats().active(), 0);
}

#[tokio::test]
async fn test_warm_up_opens_min_size() -> anyhow::Result<()> {
    let (pool, connector) = pool_with(PoolConfig::new(3, 5));

    let opened = pool.warm_up().await.context("warm up")?;
    assert_eq!(opened, 3);
    assert_eq!(connector.opened(), 3);
    assert_eq!(pool.stats().idle(), 3);

    // already at min_size
    assert_eq!(pool.warm_up().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_warm_up_stops_at_max_size() {
    let (pool, connector) = pool_with(PoolConfig::new(3, 5).with_max_size(2));

    let opened = pool.warm_up().await.expect("warm up");
    assert_eq!(opened, 2);
    assert_eq!(connector.opened(), 2);
    assert_eq!(pool.stats().total(), 2);
    assert!(pool.stats().total() <= pool.config().max_size());
}

#[test]
#[should_panic(expected = "max_size must be greater than 0")]
fn test_pool_config_with_zero_max_size() {
    PoolConfig::new(0, 5).with_max_size(0);
}

#[tokio::test]
async fn test_warm_up_after_close_fails() {
    let (pool, _connector) = pool_with(PoolConfig::new(1, 2));
    pool.close().await;
    assert!(pool.warm_up().await.unwrap_err().is_pool_closed());
}

#[tokio::test(start_paused = true)]
async fn test_maintenance_task_evicts_idle_connections() {
    let config = PoolConfig::new(0, 2)
        .with_idle_timeout_ms(5_000)
        .with_reap_interval_ms(1_000);
    let (pool, connector) = pool_with(config);

    let reaper = pool.spawn_maintenance().expect("reap interval configured");
    drop(pool.acquire().await.expect("acquire"));

    tokio::time::sleep(Duration::from_secs(7)).await;
    assert_eq!(pool.stats().total(), 0);
    assert_eq!(connector.closed(), 1);

    pool.close().await;
    reaper.await.expect("reaper exits after close");
}

#[tokio::test]
async fn test_maintenance_not_spawned_without_interval() {
    let (pool, _connector) = pool_with(PoolConfig::new(0, 2));
    assert!(pool.spawn_maintenance().is_none());
}

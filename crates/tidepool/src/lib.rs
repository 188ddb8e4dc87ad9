//! Tidepool - Bounded async connection pooling
//!
//! This crate keeps a bounded set of connections produced by a
//! [`Connector`], reusing warm ones, queuing callers when the pool is
//! saturated, and retiring connections that go stale.

pub mod health;
pub mod pool;
pub mod retry;

pub use health::{HealthStatus, HealthThresholds, PingError, PingResult, ping_connection};
pub use pool::{
    ConnectionHandle, ConnectionPool, HandleState, PoolConfig, PoolStats, PooledConnection,
};
pub use retry::{BackoffStrategy, RetryConfig, RetryEvent, RetryingConnector};
pub use tidepool_core::{ConnectParams, Connector, Result, TidepoolError};

//! Connection pooling
//!
//! This module provides the pool core: LIFO reuse of idle connections,
//! FIFO service of callers waiting on a saturated pool, idle eviction and
//! shutdown.
//!
//! # Example
//!
//! ```ignore
//! use tidepool::pool::{ConnectionPool, PoolConfig};
//!
//! let config = PoolConfig::new(0, 10)
//!     .with_acquire_timeout_ms(5000)
//!     .with_idle_timeout_ms(300000);
//!
//! let pool = ConnectionPool::new(config, params, connector);
//! let conn = pool.acquire().await?;
//! // Use connection...
//! // Connection returned to pool on drop
//! ```

mod config;
mod handle;
mod pool;
mod stats;
pub(crate) mod waiters;

#[cfg(test)]
mod tests;

pub use config::PoolConfig;
pub use handle::{ConnectionHandle, HandleState};
pub use pool::{ConnectionPool, PooledConnection};
pub use stats::PoolStats;

//! Connect retries with exponential backoff
//!
//! The pool surfaces connector failures without retrying them. Wrap a
//! connector in [`RetryingConnector`] to retry transient connect failures
//! before the pool ever sees them.
//!
//! # Example
//!
//! ```ignore
//! use tidepool::retry::{BackoffStrategy, RetryConfig, RetryingConnector};
//!
//! let backoff = BackoffStrategy::new(100, 30_000).with_jitter(true);
//! let connector = RetryingConnector::new(my_connector, RetryConfig::new(3, backoff));
//! let pool = ConnectionPool::new(PoolConfig::default(), params, connector);
//! ```

mod backoff;
mod connector;


pub use backoff::BackoffStrategy;
pub use connector::{RetryConfig, RetryEvent, RetryingConnector};

//! Connection health checks
//!
//! Pings a connection through its connector and classifies the result, so
//! the pool can refuse to hand out a connection that stopped answering.
//!
//! # Example
//!
//! ```ignore
//! use tidepool::health::{ping_connection, HealthStatus};
//!
//! let latency = ping_connection(&connector, &mut conn, Duration::from_secs(5)).await?;
//! let status = HealthStatus::from_latency(latency);
//! ```

mod ping;
mod status;


pub use ping::{PingError, PingResult, ping_connection};
pub use status::{HealthStatus, HealthThresholds};

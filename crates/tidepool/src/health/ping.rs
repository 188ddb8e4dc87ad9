//! Connection ping
//!
//! Runs the connector's liveness check under a timeout and measures the
//! round-trip time.

use std::time::Duration;

use thiserror::Error;
use tidepool_core::Connector;
use tokio::time::Instant;

/// Result of a ping operation: the round-trip time on success
pub type PingResult = Result<Duration, PingError>;

/// Error that can occur during a ping operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PingError {
    /// The connector reported the connection as dead
    #[error("Ping failed: {0}")]
    Failed(String),
    /// The connector did not answer in time
    #[error("Ping timed out after {0:?}")]
    Timeout(Duration),
}

/// Ping a connection through its connector.
///
/// A ping that takes longer than `timeout` is abandoned and reported as
/// [`PingError::Timeout`].
pub async fn ping_connection<C: Connector>(
    connector: &C,
    conn: &mut C::Connection,
    timeout: Duration,
) -> PingResult {
    let start = Instant::now();

    match tokio::time::timeout(timeout, connector.ping(conn)).await {
        Ok(Ok(())) => Ok(start.elapsed()),
        Ok(Err(e)) => Err(PingError::Failed(e.to_string())),
        Err(_) => Err(PingError::Timeout(timeout)),
    }
}

//! Pool-side wrapper around one live connection

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tidepool_core::{Connector, Result};
use tokio::time::Instant;

use crate::health::{HealthStatus, HealthThresholds, PingResult};

/// Lifecycle state of a [`ConnectionHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleState {
    /// Parked in the pool's idle stack
    Idle,
    /// Owned by exactly one caller
    InUse,
    /// Being pinged before checkout
    Validating,
    /// Torn down; the connection is gone
    Closed,
}

/// A connection plus the bookkeeping the pool needs to manage it.
///
/// The handle exclusively owns the connection until [`close`](Self::close)
/// hands it back to the connector.
pub struct ConnectionHandle<T> {
    id: u64,
    connection: Option<T>,
    state: HandleState,
    created_at: Instant,
    last_used_at: Instant,
    healthy: bool,
    last_status: HealthStatus,
    last_latency: Option<Duration>,
}

impl<T> ConnectionHandle<T> {
    /// Wrap a freshly opened connection. New handles start out in use.
    pub(crate) fn new(id: u64, connection: T) -> Self {
        let now = Instant::now();
        Self {
            id,
            connection: Some(connection),
            state: HandleState::InUse,
            created_at: now,
            last_used_at: now,
            healthy: true,
            last_status: HealthStatus::Healthy,
            last_latency: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: HandleState) {
        self.state = state;
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_used_at(&self) -> Instant {
        self.last_used_at
    }

    /// Time since the connection was opened
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Time since the connection was last released
    pub fn idle_for(&self) -> Duration {
        self.last_used_at.elapsed()
    }

    /// Last-known-good flag. Cleared by a failed ping or by the caller.
    pub fn is_healthy(&self) -> bool {
        self.healthy && self.connection.is_some()
    }

    pub fn last_status(&self) -> HealthStatus {
        self.last_status
    }

    /// Round-trip time of the last successful ping
    pub fn last_latency(&self) -> Option<Duration> {
        self.last_latency
    }

    pub fn is_closed(&self) -> bool {
        self.state == HandleState::Closed
    }

    /// Stamp the handle as just used
    pub fn mark_used(&mut self) {
        self.last_used_at = Instant::now();
    }

    /// Flag the connection as broken so the pool closes it on release
    pub fn mark_unhealthy(&mut self) {
        self.healthy = false;
    }

    /// Whether the connection outlived `max_lifetime`
    pub fn is_expired(&self, max_lifetime: Option<Duration>) -> bool {
        max_lifetime.is_some_and(|max| self.age() > max)
    }

    pub(crate) fn record_ping(&mut self, result: &PingResult, thresholds: &HealthThresholds) {
        self.last_status = HealthStatus::from_ping(result, thresholds);
        match result {
            Ok(latency) => self.last_latency = Some(*latency),
            Err(_) => self.healthy = false,
        }
    }

    pub fn connection(&self) -> Option<&T> {
        self.connection.as_ref()
    }

    pub fn connection_mut(&mut self) -> Option<&mut T> {
        self.connection.as_mut()
    }

    /// Tear the connection down through its connector.
    ///
    /// Calling this on an already closed handle does nothing.
    pub async fn close<C>(&mut self, connector: &C) -> Result<()>
    where
        C: Connector<Connection = T>,
    {
        self.state = HandleState::Closed;
        self.healthy = false;
        match self.connection.take() {
            Some(conn) => connector.teardown(conn).await,
            None => Ok(()),
        }
    }
}

impl<T> fmt::Debug for ConnectionHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("healthy", &self.healthy)
            .field("last_status", &self.last_status)
            .field("age", &self.age())
            .field("idle_for", &self.idle_for())
            .finish_non_exhaustive()
    }
}

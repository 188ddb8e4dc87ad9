//! Pool configuration types

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tidepool_core::{Result, TidepoolError};

use crate::health::HealthThresholds;

/// Configuration for a connection pool
///
/// Controls pool sizing, timeouts, checkout validation and maintenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of connections opened up front by `warm_up`
    min_size: usize,
    /// Maximum number of connections allowed in the pool
    max_size: usize,
    /// Timeout in milliseconds when acquiring a connection from the pool
    acquire_timeout_ms: u64,
    /// Timeout in milliseconds before an idle connection is closed
    idle_timeout_ms: u64,
    /// Maximum lifetime of a connection in milliseconds before it's recycled
    max_lifetime_ms: Option<u64>,
    /// Ping idle connections before handing them out
    test_on_checkout: bool,
    /// Upper bound in milliseconds for a single checkout ping
    validation_timeout_ms: u64,
    /// Failed checkout pings absorbed per acquire before giving up
    validation_retries: u32,
    /// Interval in milliseconds of the background idle reaper, if any
    reap_interval_ms: Option<u64>,
    /// Checkout ping latency still considered healthy
    healthy_latency_ms: u64,
    /// Checkout ping latency above which the connection is discarded
    degraded_latency_ms: u64,
}

impl PoolConfig {
    /// Create a new pool configuration with the given min and max sizes
    ///
    /// # Panics
    ///
    /// Panics if `min_size > max_size` or if `max_size` is 0.
    pub fn new(min_size: usize, max_size: usize) -> Self {
        assert!(
            max_size > 0,
            "max_size must be greater than 0, got {}",
            max_size
        );
        assert!(
            min_size <= max_size,
            "min_size ({}) cannot exceed max_size ({})",
            min_size,
            max_size
        );

        Self {
            min_size,
            max_size,
            acquire_timeout_ms: 30_000, // 30 seconds default
            idle_timeout_ms: 600_000,   // 10 minutes default
            max_lifetime_ms: None,
            test_on_checkout: true,
            validation_timeout_ms: 5_000,
            validation_retries: 1,
            reap_interval_ms: None,
            healthy_latency_ms: 100,
            degraded_latency_ms: 500,
        }
    }

    /// Parse a configuration from TOML and validate it
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON and validate it
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check invariants that deserialization cannot enforce
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(TidepoolError::Configuration(
                "max_size must be greater than 0".into(),
            ));
        }
        if self.min_size > self.max_size {
            return Err(TidepoolError::Configuration(format!(
                "min_size ({}) cannot exceed max_size ({})",
                self.min_size, self.max_size
            )));
        }
        if self.reap_interval_ms == Some(0) {
            return Err(TidepoolError::Configuration(
                "reap_interval_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Set the maximum pool size
    ///
    /// # Panics
    ///
    /// Panics if `max_size` is 0. A `min_size` above it is reported by
    /// [`validate`](Self::validate).
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        assert!(
            max_size > 0,
            "max_size must be greater than 0, got {}",
            max_size
        );
        self.max_size = max_size;
        self
    }

    /// Set the acquire timeout in milliseconds
    pub fn with_acquire_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.acquire_timeout_ms = timeout_ms;
        self
    }

    /// Set the idle timeout in milliseconds
    pub fn with_idle_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.idle_timeout_ms = timeout_ms;
        self
    }

    /// Set the maximum connection lifetime in milliseconds
    pub fn with_max_lifetime_ms(mut self, lifetime_ms: u64) -> Self {
        self.max_lifetime_ms = Some(lifetime_ms);
        self
    }

    /// Enable or disable the checkout ping
    pub fn with_test_on_checkout(mut self, enabled: bool) -> Self {
        self.test_on_checkout = enabled;
        self
    }

    /// Set the checkout ping timeout in milliseconds
    pub fn with_validation_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.validation_timeout_ms = timeout_ms;
        self
    }

    /// Set how many failed checkout pings one acquire absorbs
    pub fn with_validation_retries(mut self, retries: u32) -> Self {
        self.validation_retries = retries;
        self
    }

    /// Run the idle reaper every `interval_ms` milliseconds
    pub fn with_reap_interval_ms(mut self, interval_ms: u64) -> Self {
        self.reap_interval_ms = Some(interval_ms);
        self
    }

    /// Set the ping latency bounds used to classify connection health
    pub fn with_health_thresholds_ms(mut self, healthy_ms: u64, degraded_ms: u64) -> Self {
        self.healthy_latency_ms = healthy_ms;
        self.degraded_latency_ms = degraded_ms;
        self
    }

    /// Get the minimum pool size
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Get the maximum pool size
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Get the acquire timeout as a Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// Get the idle timeout as a Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Get the maximum lifetime as a Duration if set
    pub fn max_lifetime(&self) -> Option<Duration> {
        self.max_lifetime_ms.map(Duration::from_millis)
    }

    pub fn test_on_checkout(&self) -> bool {
        self.test_on_checkout
    }

    pub fn validation_timeout(&self) -> Duration {
        Duration::from_millis(self.validation_timeout_ms)
    }

    pub fn validation_retries(&self) -> u32 {
        self.validation_retries
    }

    pub fn health_thresholds(&self) -> HealthThresholds {
        HealthThresholds::new(self.healthy_latency_ms, self.degraded_latency_ms)
    }

    /// Get the reaper interval as a Duration if set
    pub fn reap_interval(&self) -> Option<Duration> {
        self.reap_interval_ms.map(Duration::from_millis)
    }
}

impl Default for PoolConfig {
    /// Create a default pool configuration
    ///
    /// Defaults:
    /// - min_size: 0
    /// - max_size: 10
    /// - acquire_timeout: 30 seconds
    /// - idle_timeout: 10 minutes
    /// - max_lifetime: None
    /// - test_on_checkout: true (5 second ping, one retry)
    /// - reap_interval: None
    fn default() -> Self {
        Self::new(0, 10)
    }
}

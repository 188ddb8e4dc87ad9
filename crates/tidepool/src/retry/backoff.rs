//! Exponential backoff between connect attempts

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Exponential backoff strategy for connect retries.
///
/// Delays grow by `multiplier` per attempt up to `max_ms`. With jitter
/// enabled each delay is spread by up to ±25% so that many callers failing
/// together do not retry in lockstep.
///
/// # Example
///
/// ```
/// use tidepool::retry::BackoffStrategy;
/// use std::time::Duration;
///
/// let backoff = BackoffStrategy::new(100, 30_000);
/// assert_eq!(backoff.calculate_delay(0), Duration::from_millis(100));
/// assert_eq!(backoff.calculate_delay(1), Duration::from_millis(200));
/// assert!(backoff.calculate_delay(20) <= Duration::from_millis(30_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffStrategy {
    /// Delay before the first retry
    initial_ms: u64,
    /// Cap for exponential growth
    max_ms: u64,
    multiplier: f64,
    jitter: bool,
}

impl BackoffStrategy {
    /// Create a strategy with the given initial and maximum delays.
    ///
    /// The initial delay is at least 1ms and the maximum never drops
    /// below it.
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        let initial_ms = initial_ms.max(1);
        Self {
            initial_ms,
            max_ms: max_ms.max(initial_ms),
            multiplier: 2.0,
            jitter: false,
        }
    }

    /// Set the growth factor; values below 1.0 are raised to 1.0
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retry number `attempt` (0 = first retry)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let delay_ms = (self.initial_ms as f64) * self.multiplier.powi(exponent);
        let capped_ms = delay_ms.min(self.max_ms as f64) as u64;

        let final_ms = if self.jitter {
            let spread = capped_ms / 4;
            let offset = rand::thread_rng().gen_range(0..=spread * 2);
            capped_ms.saturating_sub(spread).saturating_add(offset)
        } else {
            capped_ms
        };

        Duration::from_millis(final_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn has_jitter(&self) -> bool {
        self.jitter
    }
}

impl Default for BackoffStrategy {
    /// 100ms initial, 30 seconds max, doubling
    fn default() -> Self {
        Self::new(100, 30_000)
    }
}

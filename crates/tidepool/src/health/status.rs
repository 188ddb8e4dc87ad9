//! Health status classification
//!
//! Classifies connection health from ping latency.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ping::PingResult;

/// Health status of a pooled connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Answering quickly, or not checked yet
    #[default]
    Healthy,
    /// Answering, but slowly
    Degraded,
    /// Not answering, or answering too slowly to be useful
    Unhealthy,
}

impl HealthStatus {
    /// Classify health status from latency using default thresholds.
    ///
    /// ```
    /// use tidepool::health::HealthStatus;
    /// use std::time::Duration;
    ///
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(50)), HealthStatus::Healthy);
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(200)), HealthStatus::Degraded);
    /// assert_eq!(HealthStatus::from_latency(Duration::from_secs(1)), HealthStatus::Unhealthy);
    /// ```
    pub fn from_latency(latency: Duration) -> Self {
        Self::from_latency_with_thresholds(latency, &HealthThresholds::default())
    }

    /// Classify health status from latency using custom thresholds.
    pub fn from_latency_with_thresholds(latency: Duration, thresholds: &HealthThresholds) -> Self {
        if latency <= thresholds.healthy_threshold {
            HealthStatus::Healthy
        } else if latency <= thresholds.degraded_threshold {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        }
    }

    /// Classify the outcome of a ping; any ping error is unhealthy.
    pub fn from_ping(result: &PingResult, thresholds: &HealthThresholds) -> Self {
        match result {
            Ok(latency) => Self::from_latency_with_thresholds(*latency, thresholds),
            Err(_) => HealthStatus::Unhealthy,
        }
    }

    /// Both `Healthy` and `Degraded` connections may be handed out.
    pub fn is_usable(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Latency bounds for health status classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// Maximum latency considered healthy
    pub healthy_threshold: Duration,
    /// Maximum latency considered degraded (above this is unhealthy)
    pub degraded_threshold: Duration,
}

impl HealthThresholds {
    /// Create thresholds from millisecond bounds.
    ///
    /// The degraded bound is raised to the healthy bound if it is lower.
    pub fn new(healthy_ms: u64, degraded_ms: u64) -> Self {
        Self {
            healthy_threshold: Duration::from_millis(healthy_ms),
            degraded_threshold: Duration::from_millis(degraded_ms.max(healthy_ms)),
        }
    }
}

impl Default for HealthThresholds {
    /// Default thresholds: healthy <= 100ms, degraded <= 500ms
    fn default() -> Self {
        Self::new(100, 500)
    }
}

//! Pool statistics types

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of a pool's occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolStats {
    /// Connections alive or being opened (idle + active)
    total: usize,
    /// Connections parked in the idle stack
    idle: usize,
    /// Connections checked out, being validated, or being opened
    active: usize,
    /// Callers queued for a connection
    waiting: usize,
    /// Configured capacity
    max_size: usize,
}

impl PoolStats {
    pub fn new(total: usize, idle: usize, waiting: usize, max_size: usize) -> Self {
        Self {
            total,
            idle,
            active: total.saturating_sub(idle),
            waiting,
            max_size,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn idle(&self) -> usize {
        self.idle
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn waiting(&self) -> usize {
        self.waiting
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Connections an acquire could get without waiting: idle ones plus
    /// unused capacity.
    pub fn available(&self) -> usize {
        self.idle + self.max_size.saturating_sub(self.total)
    }

    /// Share of capacity currently checked out (0.0 to 1.0)
    ///
    /// Returns 0.0 for a zero-capacity snapshot.
    pub fn utilization(&self) -> f64 {
        if self.max_size == 0 {
            0.0
        } else {
            self.active as f64 / self.max_size as f64
        }
    }

    /// True when the next acquire would have to wait
    pub fn is_saturated(&self) -> bool {
        self.max_size > 0 && self.available() == 0
    }
}

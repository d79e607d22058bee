//! Simulated time source for SITL.
//!
//! Wraps a shared atomic counter for simulation time. Time only moves
//! forward.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use i2c_checker_core::Nanos;

/// Simulated time source backed by a shared atomic counter.
///
/// Multiple clones share the same underlying counter.
#[derive(Debug, Clone)]
pub struct SitlTimeSource {
    time_ns: Arc<AtomicU64>,
}

impl SitlTimeSource {
    /// Create a new time source starting at zero.
    pub fn new() -> Self {
        Self {
            time_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get current simulation time in nanoseconds.
    pub fn now_ns(&self) -> Nanos {
        self.time_ns.load(Ordering::Relaxed)
    }

    /// Move simulation time forward to `ns`; earlier values are ignored.
    pub fn set_ns(&self, ns: Nanos) {
        self.time_ns.fetch_max(ns, Ordering::Relaxed);
    }
}

impl Default for SitlTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

//! Effective bus speed measurement
//!
//! The meter collects the intervals between consecutive clock falling edges
//! within one byte and turns their average into a throughput at byte
//! completion. It is reset at every byte boundary so a measurement never
//! spans two bytes.

use crate::time::Nanos;

/// Converts an average bit time in nanoseconds to kbit/s
pub const NS_TO_KBPS: f64 = 1e6;

/// Measured speed may be at most 1% below the expected speed
pub const SLOW_TOLERANCE: f64 = 0.99;

/// Measured speed may be at most 5% above the expected speed
pub const FAST_TOLERANCE: f64 = 1.05;

/// Outcome of comparing a measured speed with the expected one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedVerdict {
    TooSlow,
    TooFast,
}

/// Inter-falling-edge interval accumulator
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedMeter {
    prev_fall: Option<Nanos>,
    total: Nanos,
    count: u32,
}

impl SpeedMeter {
    pub const fn new() -> Self {
        Self {
            prev_fall: None,
            total: 0,
            count: 0,
        }
    }

    /// Record a clock falling edge
    ///
    /// The first edge after a reset has no predecessor and only sets the
    /// reference point.
    pub fn clock_fell(&mut self, at: Nanos) {
        if let Some(prev) = self.prev_fall {
            self.total = self.total.saturating_add(at.saturating_sub(prev));
            self.count = self.count.saturating_add(1);
        }
        self.prev_fall = Some(at);
    }

    /// Number of intervals collected since the last reset
    pub fn sample_count(&self) -> u32 {
        self.count
    }

    /// Average interval in nanoseconds
    pub fn average_bit_time(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.total as f64 / self.count as f64)
    }

    /// Effective throughput in kbit/s
    pub fn throughput_kbps(&self) -> Option<f64> {
        self.average_bit_time()
            .filter(|avg| *avg > 0.0)
            .map(|avg| NS_TO_KBPS / avg)
    }

    /// Discard all samples and the falling edge reference
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Compare a measured throughput with the expected speed
pub fn check_speed(measured_kbps: f64, expected_kbps: u32) -> Option<SpeedVerdict> {
    let expected = expected_kbps as f64;
    if measured_kbps < SLOW_TOLERANCE * expected {
        Some(SpeedVerdict::TooSlow)
    } else if measured_kbps > FAST_TOLERANCE * expected {
        Some(SpeedVerdict::TooFast)
    } else {
        None
    }
}

/// Round a throughput to the nearest whole kbit/s for reporting
pub fn round_kbps(kbps: f64) -> u32 {
    (kbps + 0.5) as u32
}

//! Clock-stretch controller
//!
//! Holds the clock low for a fixed time after every falling clock edge. The
//! edge detector polls the release deadline while it is pending.

use i2c_checker_core::Nanos;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockStretch {
    duration: Nanos,
    deadline: Option<Nanos>,
}

impl ClockStretch {
    /// Controller stretching by `duration` ns, 0 disables it
    pub const fn new(duration: Nanos) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.duration > 0
    }

    pub fn duration(&self) -> Nanos {
        self.duration
    }

    /// Arm the release deadline for a falling edge observed at `fell_at`
    ///
    /// Returns `false` and arms nothing when stretching is disabled.
    pub fn begin(&mut self, fell_at: Nanos) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.deadline = Some(fell_at.saturating_add(self.duration));
        true
    }

    /// Pending release deadline
    pub fn deadline(&self) -> Option<Nanos> {
        self.deadline
    }

    /// Whether the pending deadline has been reached at `now`
    pub fn is_due(&self, now: Nanos) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Forget the pending deadline after the clock was released
    pub fn release(&mut self) {
        self.deadline = None;
    }
}

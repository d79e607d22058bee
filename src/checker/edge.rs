//! Edge detector
//!
//! The single suspension point of the checker. Waits until the clock or the
//! data line differs from its committed level, commits the change with its
//! timestamp and reports which line moved.
//!
//! A clock and data change seen in the same observation is reported as
//! [`Edge::Simultaneous`]; only the clock change is committed, so the data
//! change surfaces as a separate data edge at the same timestamp on the next
//! call.

use i2c_checker_core::{Line, Nanos};

use super::line::LineObserver;
use super::stretch::ClockStretch;
use crate::platform::{LineBus, Result};

/// Which line changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Clock,
    Data,
    /// Both lines changed; the clock change was taken
    Simultaneous,
}

/// Committed state of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSample {
    pub level: bool,
    /// Time of the last committed change
    pub changed_at: Option<Nanos>,
    /// Time of the change before that
    pub previous_change: Option<Nanos>,
}

impl LineSample {
    const fn idle() -> Self {
        Self {
            level: true,
            changed_at: None,
            previous_change: None,
        }
    }

    fn commit(&mut self, level: bool, at: Nanos) {
        self.level = level;
        self.previous_change = self.changed_at;
        self.changed_at = Some(at);
    }
}

/// A committed change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub edge: Edge,
    pub at: Nanos,
}

impl Change {
    /// The line whose change was committed
    pub fn line(&self) -> Line {
        match self.edge {
            Edge::Clock | Edge::Simultaneous => Line::Clock,
            Edge::Data => Line::Data,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeDetector {
    clock: LineSample,
    data: LineSample,
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeDetector {
    /// Detector assuming an idle bus
    pub const fn new() -> Self {
        Self {
            clock: LineSample::idle(),
            data: LineSample::idle(),
        }
    }

    /// Set the committed levels without recording a change
    pub fn prime(&mut self, clock: bool, data: bool) {
        self.clock.level = clock;
        self.data.level = data;
    }

    pub fn clock(&self) -> LineSample {
        self.clock
    }

    pub fn data(&self) -> LineSample {
        self.data
    }

    /// Suspend until a line differs from its committed level
    ///
    /// While a clock-stretch deadline is pending the bus is stepped cycle by
    /// cycle and the clock is released once the deadline is reached; that
    /// release may itself produce the reported clock edge. The weak drives
    /// are refreshed after every wake-up.
    pub async fn wait_for_change<B: LineBus + ?Sized>(
        &mut self,
        bus: &mut B,
        lines: &mut LineObserver,
        stretch: &mut ClockStretch,
    ) -> Result<Change> {
        loop {
            let (clock, data) = lines.sample(&*bus)?;
            let clock_changed = clock != self.clock.level;
            let data_changed = data != self.data.level;

            if clock_changed {
                let at = bus.now();
                self.clock.commit(clock, at);
                let edge = if data_changed {
                    Edge::Simultaneous
                } else {
                    Edge::Clock
                };
                return Ok(Change { edge, at });
            }
            if data_changed {
                let at = bus.now();
                self.data.commit(data, at);
                return Ok(Change {
                    edge: Edge::Data,
                    at,
                });
            }

            if stretch.deadline().is_some() {
                bus.wait_for_next_cycle().await?;
                if stretch.is_due(bus.now()) {
                    lines.drive(bus, Line::Clock, true)?;
                    stretch.release();
                    crate::log_trace!("end clock stretch @ {}", bus.now());
                }
            } else {
                bus.wait_for_any_change().await?;
            }
            lines.refresh(bus)?;
        }
    }
}

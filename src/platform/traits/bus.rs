//! Two-line bus interface trait
//!
//! This module defines the interface the checker uses to observe and drive
//! the clock and data lines.

use core::fmt;

use async_trait::async_trait;
use i2c_checker_core::Nanos;
use serde::{Deserialize, Serialize};

use crate::platform::Result;

/// Backend identifier of one signal line (port or pin number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u8);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.0)
    }
}

/// Two-line bus interface trait
///
/// Implemented by whatever simulates the physical lines. The checker is the
/// only caller and calls it from a single task.
///
/// # Line model
///
/// Each line has two possible drivers. The party under test drives a line
/// strongly or releases it; the checker drives a line weakly, modelling the
/// pull-up resistor (or a responder holding the line low). A strong drive
/// always wins. When nobody drives strongly the line reads the checker's weak
/// level.
///
/// # Time
///
/// All timestamps are simulation time in nanoseconds and never go backwards.
#[async_trait]
pub trait LineBus: Send {
    /// Sample the resolved level of a line
    ///
    /// # Errors
    ///
    /// Returns `BusError::UnknownLine` if `line` is not wired to this bus.
    fn read_pin(&self, line: LineId) -> Result<bool>;

    /// Set the checker's weak drive on a line
    ///
    /// Takes effect immediately; a level change it causes is visible to the
    /// next `read_pin`.
    ///
    /// # Errors
    ///
    /// Returns `BusError::UnknownLine` if `line` is not wired to this bus.
    fn drive_pin(&mut self, line: LineId, level: bool) -> Result<()>;

    /// Whether the party under test is currently driving `line`
    ///
    /// # Errors
    ///
    /// Returns `BusError::UnknownLine` if `line` is not wired to this bus.
    fn is_externally_driven(&self, line: LineId) -> Result<bool>;

    /// Suspend until the level of either line may have changed
    ///
    /// Spurious wake-ups are allowed; the caller re-samples both lines.
    ///
    /// # Errors
    ///
    /// Returns `BusError::Closed` once the scenario is over.
    async fn wait_for_any_change(&mut self) -> Result<()>;

    /// Advance simulation by one step
    ///
    /// Used while the checker has a deadline of its own pending (clock
    /// stretching), since there is no wait-for-change with timeout.
    async fn wait_for_next_cycle(&mut self) -> Result<()>;

    /// Suspend until simulation time reaches `deadline`
    async fn wait_until(&mut self, deadline: Nanos) -> Result<()>;

    /// Current simulation time
    fn now(&self) -> Nanos;
}

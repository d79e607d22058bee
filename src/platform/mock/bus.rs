//! Trace-replay bus implementation

use std::collections::VecDeque;

use async_trait::async_trait;
use i2c_checker_core::Nanos;

use crate::platform::{
    error::BusError,
    traits::{LineBus, LineId},
    Result,
};

/// Default step used by `wait_for_next_cycle`
const DEFAULT_CYCLE_NS: Nanos = 10;

/// One scheduled change of the peer's drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerDrive {
    /// Simulation time of the change
    pub at: Nanos,
    pub line: LineId,
    /// `Some(level)` drives strongly, `None` releases the line
    pub drive: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
struct MockLine {
    id: LineId,
    peer: Option<bool>,
    weak: bool,
}

impl MockLine {
    fn new(id: LineId) -> Self {
        Self {
            id,
            peer: None,
            weak: true,
        }
    }

    fn level(&self) -> bool {
        self.peer.unwrap_or(self.weak)
    }
}

/// Mock two-line bus
///
/// Both lines start released with the weak drive high. Every checker drive is
/// logged for test verification.
#[derive(Debug)]
pub struct MockBus {
    now: Nanos,
    cycle: Nanos,
    lines: [MockLine; 2],
    trace: VecDeque<PeerDrive>,
    drives: Vec<(Nanos, LineId, bool)>,
}

impl MockBus {
    /// Create an idle bus with no scheduled activity
    pub fn new(clock: LineId, data: LineId) -> Self {
        Self {
            now: 0,
            cycle: DEFAULT_CYCLE_NS,
            lines: [MockLine::new(clock), MockLine::new(data)],
            trace: VecDeque::new(),
            drives: Vec::new(),
        }
    }

    /// Schedule a peer drive change
    ///
    /// Changes must be scheduled in time order.
    pub fn peer_drive(mut self, at: Nanos, line: LineId, drive: Option<bool>) -> Self {
        self.trace.push_back(PeerDrive { at, line, drive });
        self
    }

    /// Set the step length of `wait_for_next_cycle`
    pub fn with_cycle(mut self, cycle: Nanos) -> Self {
        self.cycle = cycle.max(1);
        self
    }

    /// Weak drives issued by the checker, oldest first
    pub fn drives(&self) -> &[(Nanos, LineId, bool)] {
        &self.drives
    }

    /// Number of scheduled changes not yet replayed
    pub fn pending(&self) -> usize {
        self.trace.len()
    }

    fn line(&self, id: LineId) -> Result<&MockLine> {
        self.lines
            .iter()
            .find(|line| line.id == id)
            .ok_or(BusError::UnknownLine(id))
    }

    fn line_mut(&mut self, id: LineId) -> Result<&mut MockLine> {
        self.lines
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(BusError::UnknownLine(id))
    }

    /// Apply every scheduled change at or before `until`, advancing time
    fn replay_until(&mut self, until: Nanos) -> Result<()> {
        while let Some(change) = self.trace.front().copied() {
            if change.at > until {
                break;
            }
            self.trace.pop_front();
            self.now = self.now.max(change.at);
            self.line_mut(change.line)?.peer = change.drive;
        }
        self.now = self.now.max(until);
        Ok(())
    }
}

#[async_trait]
impl LineBus for MockBus {
    fn read_pin(&self, line: LineId) -> Result<bool> {
        Ok(self.line(line)?.level())
    }

    fn drive_pin(&mut self, line: LineId, level: bool) -> Result<()> {
        let now = self.now;
        self.line_mut(line)?.weak = level;
        self.drives.push((now, line, level));
        Ok(())
    }

    fn is_externally_driven(&self, line: LineId) -> Result<bool> {
        Ok(self.line(line)?.peer.is_some())
    }

    async fn wait_for_any_change(&mut self) -> Result<()> {
        let next = self.trace.front().map(|change| change.at).ok_or(BusError::Closed)?;
        self.replay_until(next)
    }

    async fn wait_for_next_cycle(&mut self) -> Result<()> {
        let step_end = self.now + self.cycle;
        let until = match self.trace.front() {
            Some(change) if change.at < step_end => change.at,
            _ => step_end,
        };
        self.replay_until(until)
    }

    async fn wait_until(&mut self, deadline: Nanos) -> Result<()> {
        self.replay_until(deadline)
    }

    fn now(&self) -> Nanos {
        self.now
    }
}

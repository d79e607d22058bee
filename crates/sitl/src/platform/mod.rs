//! SITL bus platform
//!
//! [`SitlBus`] implements the checker's `LineBus` over two simulated lines and
//! executes a master program as simulation time advances. Time moves only
//! inside the wait methods, straight to the next scheduled master action.

mod line;
mod timer;

pub use line::SitlLine;
pub use timer::SitlTimeSource;

use std::collections::VecDeque;

use async_trait::async_trait;
use i2c_checker::platform::Result;
use i2c_checker::{BusError, LineBus, LineId};
use i2c_checker_core::{Line, Nanos};

use crate::error::SimulatorError;
use crate::master::{MasterScript, Step};

/// Default step of `wait_for_next_cycle` in ns
pub const DEFAULT_CYCLE_NS: Nanos = 10;

/// A resolved level change on one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub at: Nanos,
    pub line: Line,
    pub level: bool,
}

/// Simulated two-line bus with a scripted master
#[derive(Debug)]
pub struct SitlBus {
    time: SitlTimeSource,
    cycle: Nanos,
    clock: SitlLine,
    data: SitlLine,
    program: VecDeque<Step>,
    resume_at: Nanos,
    waiting_clock_high: bool,
    read_bits: Vec<bool>,
    acks: Vec<bool>,
    transitions: Vec<Transition>,
}

impl SitlBus {
    /// Bus running `steps`, both lines released
    pub fn new(
        clock: LineId,
        data: LineId,
        steps: impl IntoIterator<Item = Step>,
    ) -> std::result::Result<Self, SimulatorError> {
        if clock == data {
            return Err(SimulatorError::LineConflict(clock));
        }
        Ok(Self {
            time: SitlTimeSource::new(),
            cycle: DEFAULT_CYCLE_NS,
            clock: SitlLine::new(clock),
            data: SitlLine::new(data),
            program: steps.into_iter().collect(),
            resume_at: 0,
            waiting_clock_high: false,
            read_bits: Vec::new(),
            acks: Vec::new(),
            transitions: Vec::new(),
        })
    }

    pub fn from_script(
        clock: LineId,
        data: LineId,
        script: MasterScript,
    ) -> std::result::Result<Self, SimulatorError> {
        Self::new(clock, data, script.into_steps())
    }

    /// Change the `wait_for_next_cycle` step
    pub fn with_cycle(mut self, cycle: Nanos) -> Self {
        self.cycle = cycle.max(1);
        self
    }

    /// Every resolved level change so far, in time order
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Times at which `line` changed to `level`
    pub fn edges(&self, line: Line, level: bool) -> Vec<Nanos> {
        self.transitions
            .iter()
            .filter(|t| t.line == line && t.level == level)
            .map(|t| t.at)
            .collect()
    }

    /// Bytes the master read, complete bytes only
    pub fn bytes_read(&self) -> Vec<u8> {
        self.read_bits
            .chunks_exact(8)
            .map(|bits| bits.iter().fold(0u8, |byte, &bit| (byte << 1) | bit as u8))
            .collect()
    }

    /// Acknowledge bits the master sampled, `true` = ACK
    pub fn acks(&self) -> &[bool] {
        &self.acks
    }

    /// Whether the master program has run to completion
    pub fn is_finished(&self) -> bool {
        self.program.is_empty() && !self.waiting_clock_high && self.resume_at <= self.now()
    }

    fn line(&self, line: Line) -> &SitlLine {
        match line {
            Line::Clock => &self.clock,
            Line::Data => &self.data,
        }
    }

    fn line_mut(&mut self, line: Line) -> &mut SitlLine {
        match line {
            Line::Clock => &mut self.clock,
            Line::Data => &mut self.data,
        }
    }

    fn resolve(&self, id: LineId) -> Result<Line> {
        if id == self.clock.id() {
            Ok(Line::Clock)
        } else if id == self.data.id() {
            Ok(Line::Data)
        } else {
            Err(BusError::UnknownLine(id))
        }
    }

    fn levels(&self) -> (bool, bool) {
        (self.clock.level(), self.data.level())
    }

    /// Apply `update` to `line` and record a resolved level change
    fn update_line(&mut self, line: Line, update: impl FnOnce(&mut SitlLine)) {
        let before = self.line(line).level();
        update(self.line_mut(line));
        let level = self.line(line).level();
        if level != before {
            let at = self.now();
            log::trace!("{} -> {} @ {}", line, level as u8, at);
            self.transitions.push(Transition { at, line, level });
        }
    }

    /// Execute every master step due at the current time
    fn run_due(&mut self) {
        loop {
            if self.waiting_clock_high {
                if !self.clock.level() {
                    return;
                }
                self.waiting_clock_high = false;
            }
            if self.resume_at > self.now() {
                return;
            }
            let Some(step) = self.program.pop_front() else {
                return;
            };
            match step {
                Step::Drive { line, level } => self.update_line(line, |l| l.set_peer(level)),
                Step::Delay(ns) => self.resume_at = self.now() + ns,
                Step::WaitClockHigh => self.waiting_clock_high = true,
                Step::SampleData => {
                    let bit = self.data.level();
                    self.read_bits.push(bit);
                }
                Step::SampleAck => {
                    let ack = !self.data.level();
                    self.acks.push(ack);
                }
            }
        }
    }

    /// Time of the next master action, `None` when the master is done or
    /// blocked on the clock
    fn next_wake(&self) -> Option<Nanos> {
        if self.waiting_clock_high {
            return None;
        }
        if self.resume_at > self.now() {
            return Some(self.resume_at);
        }
        (!self.program.is_empty()).then(|| self.now())
    }
}

#[async_trait]
impl LineBus for SitlBus {
    fn read_pin(&self, line: LineId) -> Result<bool> {
        Ok(self.line(self.resolve(line)?).level())
    }

    fn drive_pin(&mut self, line: LineId, level: bool) -> Result<()> {
        let line = self.resolve(line)?;
        self.update_line(line, |l| l.set_weak(level));
        Ok(())
    }

    fn is_externally_driven(&self, line: LineId) -> Result<bool> {
        Ok(self.line(self.resolve(line)?).is_driven())
    }

    async fn wait_for_any_change(&mut self) -> Result<()> {
        let before = self.levels();
        loop {
            self.run_due();
            if self.levels() != before {
                return Ok(());
            }
            match self.next_wake() {
                Some(at) => self.time.set_ns(at),
                None => return Err(BusError::Closed),
            }
        }
    }

    async fn wait_for_next_cycle(&mut self) -> Result<()> {
        let before = self.levels();
        self.run_due();
        if self.levels() != before {
            return Ok(());
        }
        let step = self.now() + self.cycle;
        let target = self.next_wake().map_or(step, |at| at.min(step));
        self.time.set_ns(target);
        self.run_due();
        Ok(())
    }

    async fn wait_until(&mut self, deadline: Nanos) -> Result<()> {
        loop {
            self.run_due();
            match self.next_wake() {
                Some(at) if at <= deadline => self.time.set_ns(at),
                _ => break,
            }
        }
        self.time.set_ns(deadline);
        self.run_due();
        Ok(())
    }

    fn now(&self) -> Nanos {
        self.time.now_ns()
    }
}

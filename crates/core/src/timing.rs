//! Timing validator
//!
//! One check per named timing parameter. Every check compares an interval
//! against the limit table of the *nominal* speed class (the speed the
//! initiator is configured for), not against the measured speed, which may be
//! lower when the responder stretches the clock.
//!
//! A validator constructed without a speed class accepts everything.

use core::fmt;

use crate::record::Violation;
use crate::speed::{SpeedClass, TimingLimits};
use crate::time::Elapsed;

/// Named timing parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingParam {
    /// Data must settle within tVD;DAT after the clock falls
    DataValid,
    /// Clock must stay high for tHD;STA after a START
    StartHold,
    /// Clock must be high for tSU;STA before a START
    StartSetup,
    /// Clock must be high for tSU;STA before a repeated START
    RepeatedStartSetup,
    /// Data must be stable for tSU;DAT before the clock rises
    DataSetup,
    /// Clock low period tLOW
    ClockLow,
    /// Clock high period tHIGH
    ClockHigh,
    /// Clock must be high for tSU;STO before a STOP
    StopSetup,
    /// Gap between STOP and the next START
    BusFree,
}

/// Which side of the limit a parameter is bounded on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Interval must be at least this long
    Min(Elapsed),
    /// Interval must be at most this long
    Max(Elapsed),
    /// Not enforced for this class
    Unchecked,
}

impl TimingParam {
    /// Limit for this parameter in the given table
    pub fn bound(self, limits: &TimingLimits) -> Bound {
        let min = |n: u64| Bound::Min(n as Elapsed);
        match self {
            TimingParam::DataValid => match limits.data_valid_max {
                Some(max) => Bound::Max(max as Elapsed),
                None => Bound::Unchecked,
            },
            TimingParam::StartHold => min(limits.start_hold_min),
            TimingParam::StartSetup | TimingParam::RepeatedStartSetup => {
                min(limits.start_setup_min)
            }
            TimingParam::DataSetup => min(limits.data_setup_min),
            TimingParam::ClockLow => min(limits.clock_low_min),
            TimingParam::ClockHigh => min(limits.clock_high_min),
            TimingParam::StopSetup => min(limits.stop_setup_min),
            TimingParam::BusFree => min(limits.bus_free_min),
        }
    }
}

impl fmt::Display for TimingParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingParam::DataValid => write!(f, "Data valid time not respected"),
            TimingParam::StartHold => write!(f, "Start hold time less than minimum in spec"),
            TimingParam::StartSetup | TimingParam::RepeatedStartSetup => {
                write!(f, "Start bit setup time less than minimum in spec")
            }
            TimingParam::DataSetup => write!(f, "Data setup time less than minimum in spec"),
            TimingParam::ClockLow => write!(f, "Clock low time less than minimum in spec"),
            TimingParam::ClockHigh => write!(f, "Clock high time less than minimum in spec"),
            TimingParam::StopSetup => write!(f, "Stop bit setup time less than minimum in spec"),
            TimingParam::BusFree => write!(f, "STOP to START time less than minimum in spec"),
        }
    }
}

/// Checks measured intervals against a speed class' limits
#[derive(Debug, Clone, Copy)]
pub struct TimingValidator {
    limits: Option<TimingLimits>,
}

impl TimingValidator {
    /// Create a validator for the nominal speed class, `None` disables all checks
    pub const fn new(class: Option<SpeedClass>) -> Self {
        let limits = match class {
            Some(class) => Some(class.limits()),
            None => None,
        };
        Self { limits }
    }

    /// Check `elapsed` against `param`'s limit
    pub fn check(&self, param: TimingParam, elapsed: Elapsed) -> Option<Violation> {
        let limits = self.limits.as_ref()?;
        let violated = match param.bound(limits) {
            Bound::Min(min) => elapsed < min,
            Bound::Max(max) => elapsed > max,
            Bound::Unchecked => false,
        };
        violated.then_some(Violation::Timing { param, elapsed })
    }

    /// Data valid time, measured from the last clock edge to a data change
    /// while the clock is low.
    ///
    /// Negative intervals belong to a stale reference point and are skipped.
    pub fn data_valid(&self, elapsed: Elapsed) -> Option<Violation> {
        if elapsed < 0 {
            return None;
        }
        self.check(TimingParam::DataValid, elapsed)
    }

    pub fn start_hold(&self, elapsed: Elapsed) -> Option<Violation> {
        self.check(TimingParam::StartHold, elapsed)
    }

    pub fn start_setup(&self, elapsed: Elapsed) -> Option<Violation> {
        self.check(TimingParam::StartSetup, elapsed)
    }

    pub fn repeated_start_setup(&self, elapsed: Elapsed) -> Option<Violation> {
        self.check(TimingParam::RepeatedStartSetup, elapsed)
    }

    pub fn data_setup(&self, elapsed: Elapsed) -> Option<Violation> {
        self.check(TimingParam::DataSetup, elapsed)
    }

    pub fn clock_low(&self, elapsed: Elapsed) -> Option<Violation> {
        self.check(TimingParam::ClockLow, elapsed)
    }

    pub fn clock_high(&self, elapsed: Elapsed) -> Option<Violation> {
        self.check(TimingParam::ClockHigh, elapsed)
    }

    pub fn stop_setup(&self, elapsed: Elapsed) -> Option<Violation> {
        self.check(TimingParam::StopSetup, elapsed)
    }

    pub fn bus_free(&self, elapsed: Elapsed) -> Option<Violation> {
        self.check(TimingParam::BusFree, elapsed)
    }
}

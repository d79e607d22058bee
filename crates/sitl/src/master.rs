//! Scripted I2C master
//!
//! A [`MasterScript`] is built up front as a flat list of [`Step`]s and then
//! executed by the [`SitlBus`](crate::SitlBus) as simulation time advances.
//! The master honours clock stretching: after releasing the clock it waits
//! until the line actually reads high before timing the high phase.
//!
//! Every clock pulse starts right after a falling clock edge:
//!
//! ```text
//! SCL fall -> data_delay -> set SDA -> (clock_low - data_delay) -> release SCL
//!          -> wait for SCL high -> clock_high -> SCL fall
//! ```

use std::collections::VecDeque;

use i2c_checker_core::{Line, Nanos, SpeedClass};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SimulatorError;

/// One master action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Pull a line low (`Some(false)`) or release it (`None`)
    Drive { line: Line, level: Option<bool> },
    /// Let simulation time pass
    Delay(Nanos),
    /// Block until the clock line reads high
    WaitClockHigh,
    /// Sample SDA as a data bit of a byte being read
    SampleData,
    /// Sample SDA as the acknowledge of a byte being written
    SampleAck,
}

/// Phase durations of the master in ns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterTiming {
    pub clock_low: Nanos,
    pub clock_high: Nanos,
    /// SDA update point after the clock falls
    pub data_delay: Nanos,
    pub start_hold: Nanos,
    pub start_setup: Nanos,
    pub stop_setup: Nanos,
    /// Idle time after a STOP
    pub bus_free: Nanos,
}

impl MasterTiming {
    /// 400 kbit/s: 2.5 us period, every phase above the Fast-mode minimums
    pub const fn fast() -> Self {
        Self {
            clock_low: 1_400,
            clock_high: 1_100,
            data_delay: 300,
            start_hold: 1_100,
            start_setup: 1_100,
            stop_setup: 1_100,
            bus_free: 1_500,
        }
    }

    /// 100 kbit/s: 10 us period
    pub const fn standard() -> Self {
        Self {
            clock_low: 5_000,
            clock_high: 5_000,
            data_delay: 1_000,
            start_hold: 5_000,
            start_setup: 5_000,
            stop_setup: 5_000,
            bus_free: 5_000,
        }
    }

    /// 10 kbit/s: 100 us period
    pub const fn slow() -> Self {
        Self {
            clock_low: 50_000,
            clock_high: 50_000,
            data_delay: 2_000,
            start_hold: 50_000,
            start_setup: 50_000,
            stop_setup: 50_000,
            bus_free: 50_000,
        }
    }

    pub const fn for_class(class: SpeedClass) -> Self {
        match class {
            SpeedClass::Fast => Self::fast(),
            SpeedClass::Standard => Self::standard(),
            SpeedClass::Slow => Self::slow(),
        }
    }

    /// Timing for a bus speed in kbit/s
    pub fn for_kbps(kbps: u32) -> Result<Self, SimulatorError> {
        SpeedClass::from_kbps(kbps)
            .map(Self::for_class)
            .ok_or(SimulatorError::UnsupportedSpeed(kbps))
    }

    /// Nominal clock period
    pub fn period(&self) -> Nanos {
        self.clock_low + self.clock_high
    }

    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.clock_low == 0 || self.clock_high == 0 {
            return Err(SimulatorError::InvalidTiming("clock phases must be non-zero"));
        }
        if self.data_delay >= self.clock_low {
            return Err(SimulatorError::InvalidTiming(
                "data must change before the clock rises",
            ));
        }
        Ok(())
    }
}

/// Builder for a master program
#[derive(Debug)]
pub struct MasterScript {
    timing: MasterTiming,
    steps: VecDeque<Step>,
    next_low: Option<Nanos>,
    jitter: Option<(StdRng, Nanos)>,
}

impl MasterScript {
    pub fn new(timing: MasterTiming) -> Result<Self, SimulatorError> {
        timing.validate()?;
        Ok(Self {
            timing,
            steps: VecDeque::new(),
            next_low: None,
            jitter: None,
        })
    }

    /// Stretch every delay by a random amount in `0..=max` ns
    ///
    /// Seeded, so a scenario is reproducible. Delays only ever grow, which
    /// keeps every phase above its minimum.
    pub fn with_jitter(mut self, seed: u64, max: Nanos) -> Self {
        self.jitter = Some((StdRng::seed_from_u64(seed), max));
        self
    }

    /// Stay idle for `ns`
    pub fn idle(mut self, ns: Nanos) -> Self {
        self.delay(ns);
        self
    }

    /// Use `ns` as the low time of the next clock pulse only
    pub fn shorten_next_low(mut self, ns: Nanos) -> Self {
        self.next_low = Some(ns);
        self
    }

    /// START from an idle bus; leaves the clock low
    pub fn start(mut self) -> Self {
        self.drive(Line::Data, Some(false));
        self.delay(self.timing.start_hold);
        self.drive(Line::Clock, Some(false));
        self
    }

    /// Repeated START after an acknowledge; leaves the clock low
    pub fn repeated_start(mut self) -> Self {
        self.clock_low_phase(None);
        self.wait_clock_high();
        self.delay(self.timing.start_setup);
        self.drive(Line::Data, Some(false));
        self.delay(self.timing.start_hold);
        self.drive(Line::Clock, Some(false));
        self
    }

    /// STOP; leaves the bus idle for the bus-free time
    pub fn stop(mut self) -> Self {
        self.clock_low_phase(Some(false));
        self.wait_clock_high();
        self.delay(self.timing.stop_setup);
        self.drive(Line::Data, None);
        self.delay(self.timing.bus_free);
        self
    }

    /// One clock pulse with SDA pulled low (`Some(false)`) or released
    ///
    /// Lower level than the byte methods; lets a scenario break the framing.
    pub fn bit(mut self, level: Option<bool>) -> Self {
        self.pulse(level, None);
        self
    }

    /// Write `byte` MSB first, then release SDA and sample the acknowledge
    pub fn write_byte(mut self, byte: u8) -> Self {
        for bit in (0..8).rev() {
            let level = if (byte >> bit) & 1 == 0 {
                Some(false)
            } else {
                None
            };
            self.pulse(level, None);
        }
        self.pulse(None, Some(Step::SampleAck));
        self
    }

    /// Read a byte with SDA released, then ACK (pull low) or NACK (release)
    pub fn read_byte(mut self, ack: bool) -> Self {
        for _ in 0..8 {
            self.pulse(None, Some(Step::SampleData));
        }
        let level = if ack { Some(false) } else { None };
        self.pulse(level, None);
        self
    }

    /// START, address byte, data bytes, STOP
    pub fn write_transaction(self, address: u8, bytes: &[u8]) -> Self {
        let mut script = self.start().write_byte(address << 1);
        for &byte in bytes {
            script = script.write_byte(byte);
        }
        script.stop()
    }

    /// START, address byte, `count` bytes read (the last one NACKed), STOP
    pub fn read_transaction(self, address: u8, count: usize) -> Self {
        let mut script = self.start().write_byte((address << 1) | 1);
        for index in 0..count {
            script = script.read_byte(index + 1 < count);
        }
        script.stop()
    }

    pub fn into_steps(self) -> VecDeque<Step> {
        self.steps
    }

    /// One clock pulse starting right after a falling edge
    fn pulse(&mut self, data: Option<bool>, sample: Option<Step>) {
        self.clock_low_phase(data);
        self.wait_clock_high();
        if let Some(step) = sample {
            self.steps.push_back(step);
        }
        self.delay(self.timing.clock_high);
        self.drive(Line::Clock, Some(false));
    }

    /// Low phase: update SDA after the data delay, then release the clock
    fn clock_low_phase(&mut self, data: Option<bool>) {
        let low = self.next_low.take().unwrap_or(self.timing.clock_low);
        let data_delay = self.timing.data_delay.min(low);
        self.delay(data_delay);
        self.drive(Line::Data, data);
        self.delay(low - data_delay);
        self.drive(Line::Clock, None);
    }

    fn wait_clock_high(&mut self) {
        self.steps.push_back(Step::WaitClockHigh);
    }

    fn drive(&mut self, line: Line, level: Option<bool>) {
        self.steps.push_back(Step::Drive { line, level });
    }

    fn delay(&mut self, ns: Nanos) {
        let extra = match self.jitter.as_mut() {
            Some((rng, max)) if *max > 0 => rng.gen_range(0..=*max),
            _ => 0,
        };
        let total = ns + extra;
        if total > 0 {
            self.steps.push_back(Step::Delay(total));
        }
    }
}

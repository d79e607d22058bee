//! Event and violation records
//!
//! Everything the checker observes is reported as a [`Record`]: either a
//! protocol event (start, byte, acknowledge, measured speed) or a
//! [`Violation`]. Violations are data, not errors; the run loop keeps going
//! after every one of them.
//!
//! The `Display` rendering is the line-based text stream compared against
//! expectation files, so the wording here must stay stable.

use core::fmt;

use crate::line::Line;
use crate::meter::SpeedVerdict;
use crate::state::TransactionState;
use crate::time::{Elapsed, Nanos};
use crate::timing::TimingParam;

/// Transfer direction decoded from the low bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Initiator writes, the checker sinks bytes (R/W bit 0)
    Write,
    /// Initiator reads, the checker sources bytes (R/W bit 1)
    Read,
}

impl Direction {
    /// Decode the R/W bit of an address byte
    pub const fn from_address_byte(byte: u8) -> Self {
        if byte & 0x1 == 0 {
            Direction::Write
        } else {
            Direction::Read
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Write => write!(f, "write"),
            Direction::Read => write!(f, "read"),
        }
    }
}

/// Protocol event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    StartBit,
    RepeatedStart,
    StopBit,
    /// A byte written by the initiator was sampled
    ByteReceived(u8),
    /// A byte sourced by the checker was clocked out
    ByteSent,
    /// Effective speed of the byte just completed
    Speed { kbps: u32 },
    /// Address byte decoded
    TransactionStarted { direction: Direction, address: u8 },
    /// The checker drives ACK
    SendingAck,
    /// The checker drives NACK
    SendingNack,
    /// The initiator acknowledged a sourced byte
    PeerAck,
    /// The initiator did not acknowledge a sourced byte
    PeerNack,
    /// Sourcing ended, waiting for STOP or repeated START
    WaitingForStop,
}

impl fmt::Display for BusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusEvent::StartBit => write!(f, "Start bit received"),
            BusEvent::RepeatedStart => write!(f, "Repeated start bit received"),
            BusEvent::StopBit => write!(f, "Stop bit received"),
            BusEvent::ByteReceived(byte) => write!(f, "Byte received: 0x{:x}", byte),
            BusEvent::ByteSent => write!(f, "Byte sent"),
            BusEvent::Speed { kbps } => write!(f, "Speed = {} Kbps", kbps),
            BusEvent::TransactionStarted { direction, address } => write!(
                f,
                "Master {} transaction started, device address=0x{:x}",
                direction, address
            ),
            BusEvent::SendingAck => write!(f, "Sending ack"),
            BusEvent::SendingNack => write!(f, "Sending nack"),
            BusEvent::PeerAck => write!(f, "Master sends ACK."),
            BusEvent::PeerNack => write!(f, "Master sends NACK."),
            BusEvent::WaitingForStop => write!(f, "Waiting for stop/start bit"),
        }
    }
}

/// Ordering faults in the transaction grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencingFault {
    /// Clock and data changed in the same observation
    SimultaneousEdges,
    /// STOP inside a byte
    StopMidByte,
    /// START inside a byte
    StartMidByte,
    /// The initiator drove the data line while the checker was acknowledging
    PeerDrivingDuringAck,
    /// Bits clocked after a NACK without STOP or repeated START
    ActivityAfterNack,
}

impl fmt::Display for SequencingFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencingFault::SimultaneousEdges => {
                write!(f, "Unsupported having SCL & SDA changing simultaneously")
            }
            SequencingFault::StopMidByte => write!(f, "Stopping when mid-byte"),
            SequencingFault::StartMidByte => write!(f, "Start bit detected mid-byte"),
            SequencingFault::PeerDrivingDuringAck => {
                write!(f, "master driving SDA during ACK phase")
            }
            SequencingFault::ActivityAfterNack => {
                write!(f, "Bit clocked after NACK without stop/start bit")
            }
        }
    }
}

/// A protocol or electrical rule that was broken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Interval outside the limit of the nominal speed class
    Timing { param: TimingParam, elapsed: Elapsed },
    /// Measured byte throughput outside the tolerance window
    Speed {
        verdict: SpeedVerdict,
        measured_kbps: u32,
        expected_kbps: u32,
    },
    /// Grammar ordering fault
    Sequencing(SequencingFault),
    /// Line level on state entry disagrees with the transition table
    LineMismatch { line: Line, expected: bool },
    /// A transition landed in ILLEGAL
    IllegalState { from: TransactionState },
}

/// Coarse violation category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationClass {
    Timing,
    Speed,
    Sequencing,
    LineMismatch,
    IllegalState,
}

impl Violation {
    pub fn class(&self) -> ViolationClass {
        match self {
            Violation::Timing { .. } => ViolationClass::Timing,
            Violation::Speed { .. } => ViolationClass::Speed,
            Violation::Sequencing(_) => ViolationClass::Sequencing,
            Violation::LineMismatch { .. } => ViolationClass::LineMismatch,
            Violation::IllegalState { .. } => ViolationClass::IllegalState,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Timing { param, elapsed } => write!(f, "{}: {}ns", param, elapsed),
            Violation::Speed {
                verdict: SpeedVerdict::TooSlow,
                ..
            } => write!(f, "speed is <1% slower than expected"),
            Violation::Speed {
                verdict: SpeedVerdict::TooFast,
                ..
            } => write!(f, "speed is faster than expected"),
            Violation::Sequencing(fault) => write!(f, "{}", fault),
            Violation::LineMismatch { line, expected } => {
                write!(f, "{} != {}", line, *expected as u8)
            }
            Violation::IllegalState { from } => {
                write!(f, "Illegal state arrived at from {}", from)
            }
        }
    }
}

/// Payload of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Event(BusEvent),
    Violation(Violation),
}

/// One line of checker output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// Simulation time of the observation
    pub time: Nanos,
    /// State the checker was in when it made the observation
    pub state: TransactionState,
    pub kind: RecordKind,
}

impl Record {
    pub const fn event(time: Nanos, state: TransactionState, event: BusEvent) -> Self {
        Self {
            time,
            state,
            kind: RecordKind::Event(event),
        }
    }

    pub const fn violation(time: Nanos, state: TransactionState, violation: Violation) -> Self {
        Self {
            time,
            state,
            kind: RecordKind::Violation(violation),
        }
    }

    pub fn as_violation(&self) -> Option<&Violation> {
        match &self.kind {
            RecordKind::Violation(v) => Some(v),
            RecordKind::Event(_) => None,
        }
    }

    pub fn as_event(&self) -> Option<&BusEvent> {
        match &self.kind {
            RecordKind::Event(e) => Some(e),
            RecordKind::Violation(_) => None,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RecordKind::Event(event) => write!(f, "{}", event),
            RecordKind::Violation(violation) => {
                write!(f, "ERROR: {}: {} @ {}", self.state, violation, self.time)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn test_direction_decode() {
        assert_eq!(Direction::from_address_byte(0x98), Direction::Write);
        assert_eq!(Direction::from_address_byte(0x99), Direction::Read);
    }

    #[test]
    fn test_event_text() {
        assert_eq!(
            format!("{}", BusEvent::ByteReceived(0x3a)),
            "Byte received: 0x3a"
        );
        assert_eq!(
            format!(
                "{}",
                BusEvent::TransactionStarted {
                    direction: Direction::Write,
                    address: 0x4c
                }
            ),
            "Master write transaction started, device address=0x4c"
        );
        assert_eq!(format!("{}", BusEvent::Speed { kbps: 400 }), "Speed = 400 Kbps");
        assert_eq!(format!("{}", BusEvent::PeerNack), "Master sends NACK.");
    }

    #[test]
    fn test_violation_record_text() {
        let record = Record::violation(
            12_345,
            TransactionState::SampleBit,
            Violation::Timing {
                param: TimingParam::ClockLow,
                elapsed: 1000,
            },
        );
        assert_eq!(
            format!("{}", record),
            "ERROR: SAMPLE_BIT: Clock low time less than minimum in spec: 1000ns @ 12345"
        );
    }

    #[test]
    fn test_line_mismatch_text() {
        let record = Record::violation(
            7,
            TransactionState::Starting,
            Violation::LineMismatch {
                line: Line::Data,
                expected: false,
            },
        );
        assert_eq!(format!("{}", record), "ERROR: STARTING: SDA != 0 @ 7");
    }

    #[test]
    fn test_violation_class() {
        let v = Violation::Sequencing(SequencingFault::SimultaneousEdges);
        assert_eq!(v.class(), ViolationClass::Sequencing);
        let r = Record::violation(0, TransactionState::Stopped, v);
        assert_eq!(r.as_violation(), Some(&v));
        assert_eq!(r.as_event(), None);
    }
}

//! Transaction states and the transition table
//!
//! The table fixes the structure of the protocol grammar: for every state the
//! line levels expected on entry and the successor when the clock or the data
//! line changes. Per-state behaviour lives in the checker, not here.
//!
//! This is the table with an explicit CHECK_START_STOP / REPEAT_START split: a
//! data change while the clock is high during a bit goes to CHECK_START_STOP,
//! which decides between STOP, repeated START and a mid-byte error.

use core::fmt;

use crate::line::Line;

/// Protocol state of the observed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    Stopped,
    Starting,
    DriveBit,
    SampleBit,
    CheckStartStop,
    ByteDone,
    DriveAck,
    AckSent,
    SampleAck,
    Acked,
    Nacked,
    RepeatStart,
    Illegal,
}

/// Static description of one state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSpec {
    /// Expected clock level on entry, `None` = don't care
    pub clock: Option<bool>,
    /// Expected data level on entry, `None` = don't care
    pub data: Option<bool>,
    /// Successor when the clock line changes
    pub on_clock: TransactionState,
    /// Successor when the data line changes
    pub on_data: TransactionState,
}

const fn spec(
    clock: Option<bool>,
    data: Option<bool>,
    on_clock: TransactionState,
    on_data: TransactionState,
) -> StateSpec {
    StateSpec {
        clock,
        data,
        on_clock,
        on_data,
    }
}

use TransactionState as S;

const HIGH: Option<bool> = Some(true);
const LOW: Option<bool> = Some(false);
const ANY: Option<bool> = None;

/// Transition table, indexed by `TransactionState as usize`
///
/// SAMPLE_ACK always leaves through its entry handler; its table successors
/// are never consulted.
pub const STATE_TABLE: [StateSpec; TransactionState::COUNT] = [
    //    expect SCL, SDA  | next on SCL change | next on SDA change
    spec(HIGH, HIGH, S::Illegal, S::Starting),          // Stopped
    spec(HIGH, LOW, S::DriveBit, S::Illegal),           // Starting
    spec(LOW, ANY, S::SampleBit, S::DriveBit),          // DriveBit
    spec(HIGH, ANY, S::DriveBit, S::CheckStartStop),    // SampleBit
    spec(HIGH, ANY, S::DriveBit, S::Illegal),           // CheckStartStop
    spec(ANY, ANY, S::DriveAck, S::Illegal),            // ByteDone
    spec(LOW, ANY, S::SampleAck, S::DriveAck),          // DriveAck
    spec(LOW, ANY, S::SampleAck, S::AckSent),           // AckSent
    spec(HIGH, ANY, S::Illegal, S::Illegal),            // SampleAck
    spec(ANY, ANY, S::DriveBit, S::Acked),              // Acked
    spec(ANY, ANY, S::DriveBit, S::Nacked),             // Nacked
    spec(HIGH, LOW, S::DriveBit, S::Illegal),           // RepeatStart
    spec(ANY, ANY, S::Illegal, S::Illegal),             // Illegal
];

impl TransactionState {
    /// Number of states
    pub const COUNT: usize = 13;

    /// Every state, in table order
    pub const ALL: [TransactionState; Self::COUNT] = [
        S::Stopped,
        S::Starting,
        S::DriveBit,
        S::SampleBit,
        S::CheckStartStop,
        S::ByteDone,
        S::DriveAck,
        S::AckSent,
        S::SampleAck,
        S::Acked,
        S::Nacked,
        S::RepeatStart,
        S::Illegal,
    ];

    /// Table entry for this state
    pub const fn spec(self) -> StateSpec {
        STATE_TABLE[self as usize]
    }

    /// Successor when `line` changed
    pub const fn next(self, line: Line) -> TransactionState {
        match line {
            Line::Clock => self.spec().on_clock,
            Line::Data => self.spec().on_data,
        }
    }

    /// Expected level of `line` on entry
    pub const fn expected(self, line: Line) -> Option<bool> {
        match line {
            Line::Clock => self.spec().clock,
            Line::Data => self.spec().data,
        }
    }

    /// Upper-case name used in reports
    pub const fn name(self) -> &'static str {
        match self {
            S::Stopped => "STOPPED",
            S::Starting => "STARTING",
            S::DriveBit => "DRIVE_BIT",
            S::SampleBit => "SAMPLE_BIT",
            S::CheckStartStop => "CHECK_START_STOP",
            S::ByteDone => "BYTE_DONE",
            S::DriveAck => "DRIVE_ACK",
            S::AckSent => "ACK_SENT",
            S::SampleAck => "SAMPLE_ACK",
            S::Acked => "ACKED",
            S::Nacked => "NACKED",
            S::RepeatStart => "REPEAT_START",
            S::Illegal => "ILLEGAL",
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_enum() {
        for (index, state) in TransactionState::ALL.iter().enumerate() {
            assert_eq!(*state as usize, index);
        }
    }

    #[test]
    fn test_start_condition_path() {
        assert_eq!(S::Stopped.next(Line::Data), S::Starting);
        assert_eq!(S::Stopped.next(Line::Clock), S::Illegal);
        assert_eq!(S::Starting.next(Line::Clock), S::DriveBit);
        assert_eq!(S::Starting.expected(Line::Clock), Some(true));
        assert_eq!(S::Starting.expected(Line::Data), Some(false));
    }

    #[test]
    fn test_bit_loop() {
        assert_eq!(S::DriveBit.next(Line::Clock), S::SampleBit);
        assert_eq!(S::DriveBit.next(Line::Data), S::DriveBit);
        assert_eq!(S::SampleBit.next(Line::Clock), S::DriveBit);
        assert_eq!(S::SampleBit.next(Line::Data), S::CheckStartStop);
    }

    #[test]
    fn test_acknowledge_path() {
        assert_eq!(S::ByteDone.next(Line::Clock), S::DriveAck);
        assert_eq!(S::ByteDone.next(Line::Data), S::Illegal);
        assert_eq!(S::DriveAck.next(Line::Clock), S::SampleAck);
        assert_eq!(S::AckSent.next(Line::Data), S::AckSent);
        assert_eq!(S::Acked.next(Line::Clock), S::DriveBit);
        assert_eq!(S::Nacked.next(Line::Clock), S::DriveBit);
    }

    #[test]
    fn test_illegal_is_a_sink() {
        assert_eq!(S::Illegal.next(Line::Clock), S::Illegal);
        assert_eq!(S::Illegal.next(Line::Data), S::Illegal);
        assert_eq!(S::Illegal.expected(Line::Clock), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(S::CheckStartStop.name(), "CHECK_START_STOP");
        assert_eq!(S::RepeatStart.name(), "REPEAT_START");
    }
}

//! State entry behaviour
//!
//! Entering a state first compares the live line levels with the state's
//! expectations, then runs the state's handler. A handler may force a
//! further transition by returning the successor.

use i2c_checker_core::time::elapsed;
use i2c_checker_core::{
    meter, BusEvent, Direction, Line, SequencingFault, TransactionState, Violation,
};

use super::line::Driver;
use super::Checker;
use crate::log_trace;
use crate::platform::{BusError, LineBus};

use TransactionState as S;

type Successor = Result<Option<TransactionState>, BusError>;

impl<B: LineBus> Checker<B> {
    /// Enter `state` and run its handler
    pub(super) fn enter(&mut self, state: TransactionState) -> Successor {
        log_trace!("state: {} -> {} @ {}", self.state, state, self.now());
        self.previous_state = self.state;
        self.state = state;
        self.check_lines()?;

        match state {
            S::Stopped => Ok(self.on_stopped()),
            S::Starting => Ok(self.on_starting()),
            S::DriveBit => self.on_drive_bit(),
            S::SampleBit => self.on_sample_bit(),
            S::CheckStartStop => Ok(self.on_check_start_stop()),
            S::DriveAck => self.on_drive_ack(),
            S::SampleAck => self.on_sample_ack(),
            S::RepeatStart => Ok(self.on_repeat_start()),
            S::Illegal => Ok(self.on_illegal()),
            S::ByteDone | S::AckSent | S::Acked | S::Nacked => Ok(None),
        }
    }

    fn check_lines(&mut self) -> Result<(), BusError> {
        for line in [Line::Clock, Line::Data] {
            if let Some(expected) = self.state.expected(line) {
                if self.lines.read(&self.bus, line)?.level != expected {
                    self.violation(Violation::LineMismatch { line, expected });
                }
            }
        }
        Ok(())
    }

    fn on_stopped(&mut self) -> Option<TransactionState> {
        self.event(BusEvent::StopBit);
        self.after_nack = false;
        if let (Some(clock), Some(data)) = (
            self.detector.clock().changed_at,
            self.detector.data().changed_at,
        ) {
            let violation = self.timing.stop_setup(elapsed(clock, data));
            self.report_violation(violation);
        }
        None
    }

    fn on_starting(&mut self) -> Option<TransactionState> {
        self.event(BusEvent::StartBit);
        if let (Some(clock), Some(data)) = (
            self.detector.clock().changed_at,
            self.detector.data().changed_at,
        ) {
            let violation = self.timing.start_setup(elapsed(clock, data));
            self.report_violation(violation);
        }
        self.begin_transaction();
        None
    }

    fn on_repeat_start(&mut self) -> Option<TransactionState> {
        self.event(BusEvent::RepeatedStart);
        if let (Some(clock), Some(data)) = (
            self.detector.clock().changed_at,
            self.detector.data().changed_at,
        ) {
            let violation = self.timing.repeated_start_setup(elapsed(clock, data));
            self.report_violation(violation);
        }
        self.begin_transaction();
        None
    }

    /// Common START / repeated START bookkeeping
    fn begin_transaction(&mut self) {
        self.byte_count = 0;
        self.bytes.begin_sink();
        self.meter.reset();
        self.after_nack = false;
        self.nack_activity_reported = false;
        if let Some(prior) = self.detector.data().previous_change {
            let violation = self.timing.bus_free(elapsed(prior, self.now()));
            self.report_violation(violation);
        }
    }

    fn on_drive_bit(&mut self) -> Successor {
        if matches!(self.previous_state, S::Starting | S::RepeatStart) {
            if let Some(start) = self.detector.data().changed_at {
                let violation = self.timing.start_hold(elapsed(start, self.now()));
                self.report_violation(violation);
            }
        }

        // Released bits read as 1 through the pull-up
        let level = self.bytes.outgoing_bit().unwrap_or(true);
        self.lines.drive(&mut self.bus, Line::Data, level)?;
        Ok(None)
    }

    fn on_sample_bit(&mut self) -> Successor {
        if self.bytes.is_sinking() {
            if let Some(data) = self.detector.data().changed_at {
                let violation = self.timing.data_setup(elapsed(data, self.now()));
                self.report_violation(violation);
            }
        }

        let sampled = self.lines.read(&self.bus, Line::Data)?.level;
        let bit = self.bytes.clock_bit(sampled);

        // The clock pulse of a STOP or repeated START is the first bit
        if self.after_nack && bit == 2 && !self.nack_activity_reported {
            self.nack_activity_reported = true;
            self.violation(Violation::Sequencing(SequencingFault::ActivityAfterNack));
        }

        if self.bytes.is_complete() {
            return Ok(Some(self.byte_done()));
        }
        Ok(None)
    }

    fn on_check_start_stop(&mut self) -> Option<TransactionState> {
        let mid_byte = self.bytes.bit_index() != 1;
        if self.detector.data().level {
            if mid_byte {
                self.violation(Violation::Sequencing(SequencingFault::StopMidByte));
            }
            Some(S::Stopped)
        } else if mid_byte {
            self.violation(Violation::Sequencing(SequencingFault::StartMidByte));
            Some(S::Starting)
        } else {
            Some(S::RepeatStart)
        }
    }

    /// Eight data bits clocked: report the byte and its speed, set up the next one
    fn byte_done(&mut self) -> TransactionState {
        let received = self.bytes.received();
        match received {
            Some(byte) => {
                self.event(BusEvent::ByteReceived(byte));
                self.acknowledging = true;
            }
            None => {
                // Bytes read by the initiator are acknowledged by it
                self.acknowledging = false;
                self.event(BusEvent::ByteSent);
            }
        }
        self.report_speed();

        match (self.byte_count, received) {
            (0, Some(command)) => {
                // The command byte is always acknowledged by this side
                self.acknowledging = true;
                let direction = Direction::from_address_byte(command);
                self.event(BusEvent::TransactionStarted {
                    direction,
                    address: command >> 1,
                });
                match direction {
                    Direction::Write => self.bytes.begin_sink(),
                    Direction::Read => {
                        let byte = self.script.next_data_byte();
                        self.bytes.begin_source(byte);
                    }
                }
            }
            (_, Some(_)) => self.bytes.begin_sink(),
            (_, None) => {}
        }
        self.meter.reset();
        S::ByteDone
    }

    fn report_speed(&mut self) {
        let Some(kbps) = self.meter.throughput_kbps() else {
            return;
        };
        let measured_kbps = meter::round_kbps(kbps);
        self.event(BusEvent::Speed {
            kbps: measured_kbps,
        });
        if let Some(expected_kbps) = self.config.expected_speed {
            if let Some(verdict) = meter::check_speed(kbps, expected_kbps) {
                self.violation(Violation::Speed {
                    verdict,
                    measured_kbps,
                    expected_kbps,
                });
            }
        }
    }

    fn on_drive_ack(&mut self) -> Successor {
        if !self.acknowledging {
            self.lines.drive(&mut self.bus, Line::Data, true)?;
            return Ok(None);
        }

        let ack = self.script.next_ack();
        self.event(if ack {
            BusEvent::SendingAck
        } else {
            BusEvent::SendingNack
        });
        self.lines.drive(&mut self.bus, Line::Data, !ack)?;
        Ok(Some(S::AckSent))
    }

    fn on_sample_ack(&mut self) -> Successor {
        let reading = self.lines.read(&self.bus, Line::Data)?;
        let nack = reading.level;

        let next = if self.acknowledging {
            if reading.driver == Driver::Peer {
                self.violation(Violation::Sequencing(SequencingFault::PeerDrivingDuringAck));
            }
            if nack {
                S::Nacked
            } else {
                S::Acked
            }
        } else {
            self.event(if nack {
                BusEvent::PeerNack
            } else {
                BusEvent::PeerAck
            });
            if nack {
                // Stop driving data once the initiator has NACKed
                self.bytes.stop_sourcing();
                self.event(BusEvent::WaitingForStop);
                S::Nacked
            } else {
                let byte = self.script.next_data_byte();
                self.bytes.load(byte);
                S::Acked
            }
        };

        if next == S::Nacked {
            self.after_nack = true;
        }
        self.bytes.restart_bits();
        self.byte_count = self.byte_count.saturating_add(1);
        Ok(Some(next))
    }

    fn on_illegal(&mut self) -> Option<TransactionState> {
        if self.previous_state != S::Illegal {
            self.violation(Violation::IllegalState {
                from: self.previous_state,
            });
        }
        None
    }
}

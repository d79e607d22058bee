//! Transaction state machine
//!
//! [`Checker`] owns the bus collaborator and all protocol state. Its run loop
//! suspends only inside the edge detector; everything after a wake-up (timing
//! checks, speed bookkeeping, state entry behaviour) runs to completion
//! before the next wait.
//!
//! ```text
//! wait_for_change -> clock/data timing checks -> successor from the table
//!                 -> enter state (line check, handler) -> forced successors
//! ```

pub mod config;
pub mod edge;
mod handlers;
pub mod line;
pub mod stretch;

pub use config::{CheckerConfig, ConfigError};
pub use edge::{Change, Edge, EdgeDetector, LineSample};
pub use line::{Driver, LineObserver, LineReading};
pub use stretch::ClockStretch;

use std::convert::Infallible;

use i2c_checker_core::time::elapsed;
use i2c_checker_core::{
    BusEvent, ByteAssembler, Line, Nanos, Record, RecordKind, ResponseScript, SequencingFault,
    SpeedMeter, TimingValidator, TransactionState, Violation,
};

use crate::core::RecordLog;
use crate::platform::{BusError, LineBus};
use crate::{log_debug, log_error, log_info, log_trace, log_warn};

/// I2C bus checker
///
/// Acts as the responder on the bus: acknowledges and sources bytes from its
/// script and optionally stretches the clock, while reporting every protocol
/// event and violation into its record log.
pub struct Checker<B: LineBus> {
    bus: B,
    config: CheckerConfig,
    lines: LineObserver,
    detector: EdgeDetector,
    stretch: ClockStretch,
    timing: TimingValidator,
    meter: SpeedMeter,
    script: ResponseScript,
    bytes: ByteAssembler,
    state: TransactionState,
    previous_state: TransactionState,
    /// Bytes completed since the last START
    byte_count: u32,
    /// Whether this side acknowledges the byte in flight
    acknowledging: bool,
    /// A NACK was seen and no STOP or START has followed yet
    after_nack: bool,
    nack_activity_reported: bool,
    records: RecordLog,
}

impl<B: LineBus> Checker<B> {
    /// Create a checker over `bus`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` does not validate.
    pub fn new(bus: B, config: CheckerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let script = config.response_script()?;
        Ok(Self {
            bus,
            lines: LineObserver::new(config.clock, config.data),
            detector: EdgeDetector::new(),
            stretch: ClockStretch::new(config.clock_stretch),
            timing: TimingValidator::new(config.timing_class()),
            meter: SpeedMeter::new(),
            script,
            bytes: ByteAssembler::new(),
            state: TransactionState::Stopped,
            previous_state: TransactionState::Stopped,
            byte_count: 0,
            acknowledging: true,
            after_nack: false,
            nack_activity_reported: false,
            records: RecordLog::new(),
            config,
        })
    }

    /// Run until the collaborator ends the scenario
    ///
    /// Never returns `Ok`. Violations are recorded and the loop continues;
    /// the only exit is a `BusError` from the collaborator (usually
    /// `BusError::Closed`).
    pub async fn run(&mut self) -> Result<Infallible, BusError> {
        let result = self.run_inner().await;
        if let Err(err) = &result {
            if *err == BusError::Closed {
                log_debug!("line bus closed @ {}", self.bus.now());
            } else {
                log_warn!("checker stopped: {}", err);
            }
        }
        result
    }

    async fn run_inner(&mut self) -> Result<Infallible, BusError> {
        self.start_up().await?;
        loop {
            self.step().await?;
        }
    }

    /// Wait for the bus to become idle
    async fn start_up(&mut self) -> Result<(), BusError> {
        log_debug!(
            "checking I2C: SCL={}, SDA={}, timing={:?}, expected speed={:?}",
            self.config.clock,
            self.config.data,
            self.config.timing_class(),
            self.config.expected_speed
        );

        // Pull-ups
        self.lines.drive(&mut self.bus, Line::Clock, true)?;
        self.lines.drive(&mut self.bus, Line::Data, true)?;

        // Ignore start-up glitches
        self.bus.wait_until(self.config.settle_time).await?;

        let (mut clock, mut data) = self.lines.sample(&self.bus)?;
        while !(clock && data) {
            self.bus.wait_for_any_change().await?;
            self.lines.refresh(&mut self.bus)?;
            (clock, data) = self.lines.sample(&self.bus)?;
        }
        self.detector.prime(clock, data);
        self.state = TransactionState::Stopped;
        self.previous_state = TransactionState::Stopped;
        Ok(())
    }

    /// One wake-up: detect, check, transition
    async fn step(&mut self) -> Result<(), BusError> {
        let change = self.next_change().await?;
        if change.edge == Edge::Simultaneous {
            self.violation(Violation::Sequencing(SequencingFault::SimultaneousEdges));
        }

        let mut next = Some(self.successor(change.line()));
        while let Some(state) = next {
            next = self.enter(state)?;
        }
        Ok(())
    }

    /// Wait for a change and run the per-edge checks
    async fn next_change(&mut self) -> Result<Change, BusError> {
        let previous_clock_change = self.detector.clock().changed_at;
        let change = self
            .detector
            .wait_for_change(&mut self.bus, &mut self.lines, &mut self.stretch)
            .await?;

        match change.edge {
            Edge::Clock | Edge::Simultaneous => {
                let rose = self.detector.clock().level;
                if let Some(since) = previous_clock_change {
                    let interval = elapsed(since, change.at);
                    let violation = if rose {
                        self.timing.clock_low(interval)
                    } else {
                        self.timing.clock_high(interval)
                    };
                    self.report_violation(violation);
                }
                if !rose {
                    self.meter.clock_fell(change.at);
                    if self.stretch.begin(change.at) {
                        self.lines.drive(&mut self.bus, Line::Clock, false)?;
                        log_trace!("start clock stretch @ {}", change.at);
                    }
                }
            }
            Edge::Data => {
                let clock = self.detector.clock();
                if !clock.level {
                    if let Some(since) = clock.changed_at {
                        let violation = self.timing.data_valid(elapsed(since, change.at));
                        self.report_violation(violation);
                    }
                }
            }
        }
        Ok(change)
    }

    /// Successor of the current state when `line` changed
    ///
    /// ILLEGAL is left only through a START or STOP condition.
    fn successor(&self, line: Line) -> TransactionState {
        if self.state == TransactionState::Illegal
            && line == Line::Data
            && self.detector.clock().level
        {
            return if self.detector.data().level {
                TransactionState::Stopped
            } else {
                TransactionState::Starting
            };
        }
        self.state.next(line)
    }

    fn now(&self) -> Nanos {
        self.bus.now()
    }

    fn record(&mut self, kind: RecordKind) {
        let record = Record {
            time: self.now(),
            state: self.state,
            kind,
        };
        match record.kind {
            RecordKind::Event(_) => log_info!("{}", record),
            RecordKind::Violation(_) => log_error!("{}", record),
        }
        self.records.push(record);
    }

    fn event(&mut self, event: BusEvent) {
        self.record(RecordKind::Event(event));
    }

    fn violation(&mut self, violation: Violation) {
        self.record(RecordKind::Violation(violation));
    }

    fn report_violation(&mut self, violation: Option<Violation>) {
        if let Some(violation) = violation {
            self.violation(violation);
        }
    }

    /// Current protocol state
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Everything reported so far
    pub fn records(&self) -> &RecordLog {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut RecordLog {
        &mut self.records
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Take the bus back, dropping all checker state
    pub fn into_bus(self) -> B {
        self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockBus;
    use crate::platform::LineId;
    use i2c_checker_core::TimingParam;

    const SCL: LineId = LineId(0);
    const SDA: LineId = LineId(1);

    /// Fast-mode initiator writing `bytes`, releasing SDA for every ACK bit
    fn fast_write(bytes: &[u8]) -> MockBus {
        let mut bus = MockBus::new(SCL, SDA)
            .peer_drive(1_000, SDA, Some(false))
            .peer_drive(2_100, SCL, Some(false));
        let mut t = 2_100;
        let pulse = |bus: MockBus, t: &mut u64, sda: Option<bool>| {
            let bus = bus
                .peer_drive(*t + 300, SDA, sda)
                .peer_drive(*t + 1_400, SCL, None)
                .peer_drive(*t + 2_500, SCL, Some(false));
            *t += 2_500;
            bus
        };
        for &byte in bytes {
            for bit in (0..8).rev() {
                let sda = if (byte >> bit) & 1 == 0 { Some(false) } else { None };
                bus = pulse(bus, &mut t, sda);
            }
            bus = pulse(bus, &mut t, None);
        }
        bus.peer_drive(t + 300, SDA, Some(false))
            .peer_drive(t + 1_400, SCL, None)
            .peer_drive(t + 2_500, SDA, None)
    }

    fn fast_config() -> CheckerConfig {
        CheckerConfig::new(SCL, SDA).with_expected_speed(400)
    }

    /// START at 1000, clock falls at 2100
    fn fast_start() -> MockBus {
        MockBus::new(SCL, SDA)
            .peer_drive(1_000, SDA, Some(false))
            .peer_drive(2_100, SCL, Some(false))
    }

    fn timing_violations(checker: &Checker<MockBus>) -> Vec<Violation> {
        checker
            .records()
            .violations()
            .filter(|violation| matches!(violation, Violation::Timing { .. }))
            .copied()
            .collect()
    }

    async fn run_fast(bus: MockBus) -> Checker<MockBus> {
        let mut checker = Checker::new(bus, fast_config()).unwrap();
        assert_eq!(checker.run().await.unwrap_err(), BusError::Closed);
        checker
    }

    #[tokio::test]
    async fn test_write_transaction() {
        let mut checker = Checker::new(fast_write(&[0x98, 0x3a]), fast_config()).unwrap();

        assert_eq!(checker.run().await.unwrap_err(), BusError::Closed);

        assert_eq!(
            checker.records().lines(),
            vec![
                "Start bit received",
                "Byte received: 0x98",
                "Speed = 400 Kbps",
                "Master write transaction started, device address=0x4c",
                "Sending ack",
                "Byte received: 0x3a",
                "Speed = 400 Kbps",
                "Sending ack",
                "Stop bit received",
            ]
        );
        assert_eq!(checker.state(), TransactionState::Stopped);
    }

    #[tokio::test]
    async fn test_scripted_nack_on_command_byte() {
        let config = fast_config().with_ack_sequence(&[false]);
        let mut checker = Checker::new(fast_write(&[0x98]), config).unwrap();

        let _ = checker.run().await;

        let lines = checker.records().lines();
        assert!(lines.contains(&"Sending nack".to_string()));
        assert_eq!(checker.records().violations().count(), 0);
    }

    #[tokio::test]
    async fn test_short_clock_low_is_one_violation() {
        let bus = MockBus::new(SCL, SDA)
            .peer_drive(1_000, SDA, Some(false))
            .peer_drive(2_100, SCL, Some(false))
            .peer_drive(3_100, SCL, None);
        let mut checker = Checker::new(bus, fast_config()).unwrap();

        let _ = checker.run().await;

        let violations: Vec<_> = checker.records().violations().copied().collect();
        assert_eq!(
            violations,
            vec![Violation::Timing {
                param: TimingParam::ClockLow,
                elapsed: 1_000
            }]
        );
        assert_eq!(
            checker.records().lines()[1],
            "ERROR: DRIVE_BIT: Clock low time less than minimum in spec: 1000ns @ 3100"
        );
    }

    #[tokio::test]
    async fn test_simultaneous_edges_reported_once() {
        let bus = MockBus::new(SCL, SDA)
            .peer_drive(1_000, SDA, Some(false))
            .peer_drive(2_000, SCL, Some(false))
            .peer_drive(2_000, SDA, None);
        let mut checker = Checker::new(bus, fast_config()).unwrap();

        let _ = checker.run().await;

        assert_eq!(
            checker.records().lines(),
            vec![
                "Start bit received",
                "ERROR: STARTING: Unsupported having SCL & SDA changing simultaneously @ 2000",
            ]
        );
        // Clock priority, the deferred data change loops in DRIVE_BIT
        assert_eq!(checker.state(), TransactionState::DriveBit);
    }

    #[tokio::test]
    async fn test_illegal_state_recovers_on_start() {
        let bus = MockBus::new(SCL, SDA)
            .peer_drive(1_000, SCL, Some(false))
            .peer_drive(2_000, SCL, None)
            .peer_drive(3_000, SDA, Some(false));
        let mut checker = Checker::new(bus, CheckerConfig::new(SCL, SDA)).unwrap();

        let _ = checker.run().await;

        assert_eq!(
            checker.records().lines(),
            vec![
                "ERROR: ILLEGAL: Illegal state arrived at from STOPPED @ 1000",
                "Start bit received",
            ]
        );
        assert_eq!(checker.state(), TransactionState::Starting);
    }

    #[tokio::test]
    async fn test_waits_for_idle_bus() {
        // Clock held low through startup, released at 500
        let bus = MockBus::new(SCL, SDA)
            .peer_drive(0, SCL, Some(false))
            .peer_drive(500, SCL, None)
            .peer_drive(1_000, SDA, Some(false));
        let mut checker = Checker::new(bus, CheckerConfig::new(SCL, SDA)).unwrap();

        let _ = checker.run().await;

        assert_eq!(checker.records().lines(), vec!["Start bit received"]);
    }

    #[tokio::test]
    async fn test_stretch_holds_clock_low() {
        let bus = MockBus::new(SCL, SDA)
            .peer_drive(1_000, SDA, Some(false))
            .peer_drive(2_100, SCL, Some(false))
            .peer_drive(3_500, SCL, None);
        let config = CheckerConfig::new(SCL, SDA).with_clock_stretch(3_000);
        let mut checker = Checker::new(bus, config).unwrap();

        let _ = checker.run().await;

        let bus = checker.into_bus();
        assert!(bus.drives().contains(&(2_100, SCL, false)));
        assert!(bus.drives().contains(&(5_100, SCL, true)));
    }

    #[tokio::test]
    async fn test_bus_free_measured_from_stop() {
        let bus = fast_start()
            .peer_drive(3_500, SCL, None)
            .peer_drive(4_600, SDA, None)
            .peer_drive(5_000, SDA, Some(false));

        let checker = run_fast(bus).await;

        assert_eq!(
            timing_violations(&checker),
            vec![Violation::Timing {
                param: TimingParam::BusFree,
                elapsed: 400
            }]
        );
        assert!(checker.records().lines().contains(
            &"ERROR: STARTING: STOP to START time less than minimum in spec: 400ns @ 5000"
                .to_string()
        ));
        assert_eq!(checker.state(), TransactionState::Starting);
    }

    #[tokio::test]
    async fn test_stop_setup_measured_from_clock_rise() {
        let bus = fast_start()
            .peer_drive(3_500, SCL, None)
            .peer_drive(3_800, SDA, None);

        let checker = run_fast(bus).await;

        assert_eq!(
            timing_violations(&checker),
            vec![Violation::Timing {
                param: TimingParam::StopSetup,
                elapsed: 300
            }]
        );
        assert!(checker.records().lines().contains(
            &"ERROR: STOPPED: Stop bit setup time less than minimum in spec: 300ns @ 3800"
                .to_string()
        ));
    }

    #[tokio::test]
    async fn test_start_hold_measured_from_data_fall() {
        let bus = MockBus::new(SCL, SDA)
            .peer_drive(1_000, SDA, Some(false))
            .peer_drive(1_200, SCL, Some(false));

        let checker = run_fast(bus).await;

        assert_eq!(
            timing_violations(&checker),
            vec![Violation::Timing {
                param: TimingParam::StartHold,
                elapsed: 200
            }]
        );
        assert_eq!(
            checker.records().lines(),
            vec![
                "Start bit received",
                "ERROR: DRIVE_BIT: Start hold time less than minimum in spec: 200ns @ 1200",
            ]
        );
    }

    #[tokio::test]
    async fn test_late_data_change_violates_valid_and_setup() {
        let bus = fast_start()
            .peer_drive(3_450, SDA, None)
            .peer_drive(3_500, SCL, None);

        let checker = run_fast(bus).await;

        assert_eq!(
            timing_violations(&checker),
            vec![
                Violation::Timing {
                    param: TimingParam::DataValid,
                    elapsed: 1_350
                },
                Violation::Timing {
                    param: TimingParam::DataSetup,
                    elapsed: 50
                },
            ]
        );
        let lines = checker.records().lines();
        assert!(lines.contains(
            &"ERROR: DRIVE_BIT: Data valid time not respected: 1350ns @ 3450".to_string()
        ));
        assert!(lines.contains(
            &"ERROR: SAMPLE_BIT: Data setup time less than minimum in spec: 50ns @ 3500"
                .to_string()
        ));
    }

    #[tokio::test]
    async fn test_start_setup_measured_from_clock_rise() {
        // Clock glitch lands in ILLEGAL, the START that follows recovers
        let bus = MockBus::new(SCL, SDA)
            .peer_drive(1_000, SCL, Some(false))
            .peer_drive(2_400, SCL, None)
            .peer_drive(2_700, SDA, Some(false));

        let checker = run_fast(bus).await;

        assert_eq!(
            timing_violations(&checker),
            vec![Violation::Timing {
                param: TimingParam::StartSetup,
                elapsed: 300
            }]
        );
        assert_eq!(
            checker.records().lines()[1..],
            [
                "Start bit received",
                "ERROR: STARTING: Start bit setup time less than minimum in spec: 300ns @ 2700",
            ]
        );
    }

    #[test]
    fn test_entry_checks_line_levels() {
        // Idle bus, both lines high
        let mut checker = Checker::new(MockBus::new(SCL, SDA), fast_config()).unwrap();

        assert_eq!(checker.enter(TransactionState::Starting).unwrap(), None);

        let violations: Vec<_> = checker.records().violations().copied().collect();
        assert_eq!(
            violations,
            vec![Violation::LineMismatch {
                line: Line::Data,
                expected: false
            }]
        );
        assert_eq!(checker.records().lines()[0], "ERROR: STARTING: SDA != 0 @ 0");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bus = MockBus::new(SCL, SDA);
        let config = CheckerConfig::new(SCL, SCL);
        assert!(matches!(
            Checker::new(bus, config),
            Err(ConfigError::SameLine(_))
        ));
    }
}

#![cfg(feature = "mock")] // Trace-replay bus is behind the mock feature

use i2c_checker::platform::mock::MockBus;
use i2c_checker::protocol::{BusEvent, Record, TransactionState};
use i2c_checker::{BusError, Checker, CheckerConfig, ConfigError, LineId};

const SCL: LineId = LineId(2);
const SDA: LineId = LineId(3);

/// START, one clock pulse with SDA low, STOP
fn start_stop() -> MockBus {
    MockBus::new(SCL, SDA)
        .peer_drive(1_000, SDA, Some(false))
        .peer_drive(2_100, SCL, Some(false))
        .peer_drive(3_500, SCL, None)
        .peer_drive(4_600, SDA, None)
}

#[tokio::test]
async fn test_drain_returns_records_in_order() {
    let config = CheckerConfig::new(SCL, SDA).with_expected_speed(400);
    let mut checker = Checker::new(start_stop(), config).unwrap();

    assert_eq!(checker.run().await.unwrap_err(), BusError::Closed);

    let records = checker.records_mut().drain();
    assert_eq!(
        records,
        vec![
            Record::event(1_000, TransactionState::Starting, BusEvent::StartBit),
            Record::event(4_600, TransactionState::Stopped, BusEvent::StopBit),
        ]
    );
    assert!(checker.records().is_empty());
    assert_eq!(checker.bus().pending(), 0);
}

#[test]
fn test_unknown_speed_class_still_valid() {
    let config = CheckerConfig::new(SCL, SDA).with_expected_speed(160);
    assert_eq!(config.timing_class(), None);
    assert!(Checker::new(MockBus::new(SCL, SDA), config).is_ok());
}

#[test]
fn test_zero_speed_rejected() {
    let config = CheckerConfig::new(SCL, SDA).with_nominal_speed(0);
    assert!(matches!(
        Checker::new(MockBus::new(SCL, SDA), config),
        Err(ConfigError::ZeroSpeed(_))
    ));
}

//! Line observer
//!
//! Two-driver model of each line: the peer either drives it strongly or
//! leaves it to the checker's weak drive. Reading never writes to the bus;
//! re-asserting the weak drive is an explicit [`LineObserver::refresh`].

use i2c_checker_core::Line;

use crate::platform::{LineBus, LineId, Result};

/// Who determines the level of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// The party under test drives the line strongly
    Peer,
    /// The line is released by the peer and reads the checker's weak drive
    Ours,
}

/// Sampled line level and its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineReading {
    pub level: bool,
    pub driver: Driver,
}

/// Weak drive cache for the clock and data lines
#[derive(Debug, Clone, Copy)]
pub struct LineObserver {
    clock: LineId,
    data: LineId,
    weak_clock: bool,
    weak_data: bool,
}

impl LineObserver {
    /// Observer with both weak drives released (high)
    pub fn new(clock: LineId, data: LineId) -> Self {
        Self {
            clock,
            data,
            weak_clock: true,
            weak_data: true,
        }
    }

    /// Backend identifier of `line`
    pub fn id(&self, line: Line) -> LineId {
        match line {
            Line::Clock => self.clock,
            Line::Data => self.data,
        }
    }

    /// Level this side currently drives weakly on `line`
    pub fn weak_level(&self, line: Line) -> bool {
        match line {
            Line::Clock => self.weak_clock,
            Line::Data => self.weak_data,
        }
    }

    /// Sample `line`
    ///
    /// The peer's level when it drives the line, otherwise our weak level.
    pub fn read<B: LineBus + ?Sized>(&self, bus: &B, line: Line) -> Result<LineReading> {
        let id = self.id(line);
        if bus.is_externally_driven(id)? {
            Ok(LineReading {
                level: bus.read_pin(id)?,
                driver: Driver::Peer,
            })
        } else {
            Ok(LineReading {
                level: self.weak_level(line),
                driver: Driver::Ours,
            })
        }
    }

    /// Sample both lines, clock first
    pub fn sample<B: LineBus + ?Sized>(&self, bus: &B) -> Result<(bool, bool)> {
        Ok((
            self.read(bus, Line::Clock)?.level,
            self.read(bus, Line::Data)?.level,
        ))
    }

    /// Weakly drive `line` to `level` and remember it
    pub fn drive<B: LineBus + ?Sized>(&mut self, bus: &mut B, line: Line, level: bool) -> Result<()> {
        match line {
            Line::Clock => self.weak_clock = level,
            Line::Data => self.weak_data = level,
        }
        bus.drive_pin(self.id(line), level)
    }

    /// Re-assert the weak drive on every line the peer has released
    pub fn refresh<B: LineBus + ?Sized>(&self, bus: &mut B) -> Result<()> {
        for line in [Line::Clock, Line::Data] {
            let id = self.id(line);
            if !bus.is_externally_driven(id)? {
                bus.drive_pin(id, self.weak_level(line))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockBus;

    const SCL: LineId = LineId(4);
    const SDA: LineId = LineId(5);

    #[test]
    fn test_read_released_line_reports_our_drive() {
        let mut bus = MockBus::new(SCL, SDA);
        let mut lines = LineObserver::new(SCL, SDA);
        lines.drive(&mut bus, Line::Data, false).unwrap();

        let reading = lines.read(&bus, Line::Data).unwrap();
        assert_eq!(
            reading,
            LineReading {
                level: false,
                driver: Driver::Ours
            }
        );
    }

    #[tokio::test]
    async fn test_read_peer_driven_line() {
        let mut bus = MockBus::new(SCL, SDA).peer_drive(10, SCL, Some(false));
        let lines = LineObserver::new(SCL, SDA);
        bus.wait_for_any_change().await.unwrap();

        let reading = lines.read(&bus, Line::Clock).unwrap();
        assert_eq!(reading.driver, Driver::Peer);
        assert!(!reading.level);
        assert_eq!(lines.sample(&bus).unwrap(), (false, true));
    }

    #[test]
    fn test_read_does_not_write() {
        let bus = MockBus::new(SCL, SDA);
        let lines = LineObserver::new(SCL, SDA);
        lines.read(&bus, Line::Clock).unwrap();
        lines.read(&bus, Line::Data).unwrap();
        assert!(bus.drives().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_skips_peer_driven_lines() {
        let mut bus = MockBus::new(SCL, SDA).peer_drive(10, SCL, Some(false));
        let lines = LineObserver::new(SCL, SDA);
        bus.wait_for_any_change().await.unwrap();

        lines.refresh(&mut bus).unwrap();
        assert_eq!(bus.drives(), &[(10, SDA, true)]);
    }
}

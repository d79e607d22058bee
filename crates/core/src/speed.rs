//! Bus speed classes and I2C electrical timing limits
//!
//! The limits are the minimum/maximum values from the I2C-bus specification
//! (UM10204, table "Characteristics of the SDA and SCL bus lines") for
//! Standard-mode and Fast-mode, expressed in nanoseconds.

use crate::time::Nanos;

/// Nominal I2C speed class.
///
/// Selects the timing limit table used by the timing validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedClass {
    /// Standard-mode, 100 kbit/s
    Standard,
    /// Fast-mode, 400 kbit/s
    Fast,
    /// 10 kbit/s, checked as a looser Standard-mode variant
    Slow,
}

/// Timing limits for one speed class (nanoseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingLimits {
    /// tHD;STA - hold time after (repeated) START
    pub start_hold_min: Nanos,
    /// tSU;STA - set-up time for a (repeated) START
    pub start_setup_min: Nanos,
    /// tSU;DAT - data set-up time
    pub data_setup_min: Nanos,
    /// tLOW - low period of the clock
    pub clock_low_min: Nanos,
    /// tHIGH - high period of the clock
    pub clock_high_min: Nanos,
    /// tSU;STO - set-up time for STOP
    pub stop_setup_min: Nanos,
    /// tBUF - bus free time between a STOP and a START
    pub bus_free_min: Nanos,
    /// tVD;DAT - data valid time, `None` when not enforced
    pub data_valid_max: Option<Nanos>,
}

/// Standard-mode limits
pub const STANDARD_LIMITS: TimingLimits = TimingLimits {
    start_hold_min: 4000,
    start_setup_min: 4700,
    data_setup_min: 250,
    clock_low_min: 4700,
    clock_high_min: 4000,
    stop_setup_min: 4000,
    bus_free_min: 4700,
    data_valid_max: Some(3450),
};

/// Fast-mode limits
pub const FAST_LIMITS: TimingLimits = TimingLimits {
    start_hold_min: 600,
    start_setup_min: 600,
    data_setup_min: 100,
    clock_low_min: 1300,
    clock_high_min: 900,
    stop_setup_min: 600,
    bus_free_min: 1300,
    data_valid_max: Some(900),
};

/// 10 kbit/s limits: Standard-mode minimums, data valid time not enforced
pub const SLOW_LIMITS: TimingLimits = TimingLimits {
    data_valid_max: None,
    ..STANDARD_LIMITS
};

impl SpeedClass {
    /// Map a nominal speed in kbit/s to its class.
    ///
    /// Only 10, 100 and 400 kbit/s are modelled.
    pub const fn from_kbps(kbps: u32) -> Option<Self> {
        match kbps {
            100 => Some(SpeedClass::Standard),
            400 => Some(SpeedClass::Fast),
            10 => Some(SpeedClass::Slow),
            _ => None,
        }
    }

    /// Nominal speed in kbit/s
    pub const fn kbps(self) -> u32 {
        match self {
            SpeedClass::Standard => 100,
            SpeedClass::Fast => 400,
            SpeedClass::Slow => 10,
        }
    }

    /// Timing limit table for this class
    pub const fn limits(self) -> TimingLimits {
        match self {
            SpeedClass::Standard => STANDARD_LIMITS,
            SpeedClass::Fast => FAST_LIMITS,
            SpeedClass::Slow => SLOW_LIMITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kbps() {
        assert_eq!(SpeedClass::from_kbps(100), Some(SpeedClass::Standard));
        assert_eq!(SpeedClass::from_kbps(400), Some(SpeedClass::Fast));
        assert_eq!(SpeedClass::from_kbps(10), Some(SpeedClass::Slow));
        assert_eq!(SpeedClass::from_kbps(160), None);
        assert_eq!(SpeedClass::from_kbps(1000), None);
    }

    #[test]
    fn test_kbps_round_trip() {
        for class in [SpeedClass::Standard, SpeedClass::Fast, SpeedClass::Slow] {
            assert_eq!(SpeedClass::from_kbps(class.kbps()), Some(class));
        }
    }

    #[test]
    fn test_fast_mode_limits() {
        let limits = SpeedClass::Fast.limits();
        assert_eq!(limits.clock_low_min, 1300);
        assert_eq!(limits.clock_high_min, 900);
        assert_eq!(limits.data_valid_max, Some(900));
    }

    #[test]
    fn test_slow_is_standard_without_data_valid() {
        let slow = SpeedClass::Slow.limits();
        let standard = SpeedClass::Standard.limits();
        assert_eq!(slow.clock_low_min, standard.clock_low_min);
        assert_eq!(slow.bus_free_min, standard.bus_free_min);
        assert_eq!(slow.data_valid_max, None);
    }
}

use i2c_checker::LineId;

/// Errors that can occur while setting up a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("Clock and data both use {0}")]
    LineConflict(LineId),

    #[error("Invalid master timing: {0}")]
    InvalidTiming(&'static str),

    #[error("No master timing for {0} kbit/s")]
    UnsupportedSpeed(u32),
}

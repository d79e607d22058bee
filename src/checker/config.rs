//! Checker configuration
//!
//! Everything the test orchestration decides about a run: which lines to
//! watch, what speed to expect, how to answer the initiator and whether to
//! stretch the clock. Serializable so scenario parameters can live in JSON
//! files next to the expectation logs.

use i2c_checker_core::{Nanos, ResponseScript, ScriptError, SpeedClass};
use serde::{Deserialize, Serialize};

use crate::platform::LineId;

/// Startup glitch window ignored before the first sample
pub const DEFAULT_SETTLE_TIME_NS: Nanos = 100;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Clock and data are wired to the same line
    #[error("clock and data share {0}")]
    SameLine(LineId),

    /// A speed of zero cannot be measured against
    #[error("{0} speed must be non-zero")]
    ZeroSpeed(&'static str),

    /// A response sequence does not fit the script storage
    #[error("response script: {0}")]
    Script(ScriptError),
}

impl From<ScriptError> for ConfigError {
    fn from(err: ScriptError) -> Self {
        ConfigError::Script(err)
    }
}

/// Checker run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Clock line (SCL)
    pub clock: LineId,
    /// Data line (SDA)
    pub data: LineId,
    /// Throughput the checker should measure in kbit/s, `None` skips the check
    #[serde(default)]
    pub expected_speed: Option<u32>,
    /// Speed the initiator is configured for in kbit/s
    ///
    /// Selects the timing limits when it differs from the measured speed,
    /// which is the case while the checker stretches the clock.
    #[serde(default)]
    pub nominal_speed: Option<u32>,
    /// Bytes sourced during read transactions
    #[serde(default)]
    pub tx_data: Vec<u8>,
    /// ACK (`true`) / NACK (`false`) decision for each byte the checker acknowledges
    #[serde(default)]
    pub ack_sequence: Vec<bool>,
    /// Clock stretch after every falling clock edge in ns, 0 disables
    #[serde(default)]
    pub clock_stretch: Nanos,
    /// Startup glitch window in ns
    #[serde(default = "default_settle_time")]
    pub settle_time: Nanos,
}

fn default_settle_time() -> Nanos {
    DEFAULT_SETTLE_TIME_NS
}

impl CheckerConfig {
    /// Watch `clock`/`data` without speed expectations or scripts
    pub fn new(clock: LineId, data: LineId) -> Self {
        Self {
            clock,
            data,
            expected_speed: None,
            nominal_speed: None,
            tx_data: Vec::new(),
            ack_sequence: Vec::new(),
            clock_stretch: 0,
            settle_time: DEFAULT_SETTLE_TIME_NS,
        }
    }

    pub fn with_expected_speed(mut self, kbps: u32) -> Self {
        self.expected_speed = Some(kbps);
        self
    }

    pub fn with_nominal_speed(mut self, kbps: u32) -> Self {
        self.nominal_speed = Some(kbps);
        self
    }

    pub fn with_tx_data(mut self, data: &[u8]) -> Self {
        self.tx_data = data.to_vec();
        self
    }

    pub fn with_ack_sequence(mut self, acks: &[bool]) -> Self {
        self.ack_sequence = acks.to_vec();
        self
    }

    pub fn with_clock_stretch(mut self, ns: Nanos) -> Self {
        self.clock_stretch = ns;
        self
    }

    pub fn with_settle_time(mut self, ns: Nanos) -> Self {
        self.settle_time = ns;
        self
    }

    /// Speed class whose limits the timing checks use
    ///
    /// Taken from the nominal speed when set, else from the expected speed.
    /// Speeds outside the known classes disable the timing checks.
    pub fn timing_class(&self) -> Option<SpeedClass> {
        SpeedClass::from_kbps(self.nominal_speed.or(self.expected_speed)?)
    }

    /// Build the response script from the configured sequences
    pub fn response_script(&self) -> Result<ResponseScript, ConfigError> {
        Ok(ResponseScript::new(&self.ack_sequence, &self.tx_data)?)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the lines coincide, a speed is zero or a
    /// script sequence is longer than the script storage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock == self.data {
            return Err(ConfigError::SameLine(self.clock));
        }
        if self.expected_speed == Some(0) {
            return Err(ConfigError::ZeroSpeed("expected"));
        }
        if self.nominal_speed == Some(0) {
            return Err(ConfigError::ZeroSpeed("nominal"));
        }
        self.response_script()?;
        Ok(())
    }
}

//! i2c_checker - I2C bus protocol observer and scripted responder
//!
//! This library watches the two shared I2C lines through a [`platform::LineBus`]
//! collaborator, rebuilds the transaction grammar from edge transitions and
//! reports every timing, speed and sequencing violation it sees. It can answer
//! the initiator from a scripted ACK/NACK and data sequence and stretch the
//! clock to emulate a slow responder.
//!
//! The protocol data model (states, limits, records) lives in the `no_std`
//! `i2c_checker_core` crate and is re-exported as [`protocol`].

// Line collaborator abstraction
pub mod platform;

// Logging and the record log
pub mod core;

// Transaction state machine and its helpers
pub mod checker;

pub use i2c_checker_core as protocol;

pub use checker::{Checker, CheckerConfig, ConfigError};
pub use platform::{BusError, LineBus, LineId};

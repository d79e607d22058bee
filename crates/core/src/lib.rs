//! i2c_checker_core - Pure no_std protocol logic for the I2C bus checker
//!
//! This crate contains the transaction grammar, the electrical timing limits
//! and the bookkeeping types the checker run loop is built from. None of it
//! touches a bus: line access and simulation time are injected by the
//! `i2c_checker` crate.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Data, not errors**: Protocol findings are [`record::Violation`] values
//!
//! # Modules
//!
//! - [`time`]: Simulation time units (nanoseconds)
//! - [`line`]: The two bus lines
//! - [`speed`]: Speed classes and their timing limit tables
//! - [`timing`]: Timing validator, one check per named parameter
//! - [`meter`]: Effective bus speed measurement
//! - [`script`]: Scripted ACK/NACK decisions and outgoing bytes
//! - [`byte`]: Bit-by-bit byte assembly
//! - [`state`]: Transaction states and the transition table
//! - [`record`]: Event and violation records

#![no_std]

pub mod byte;
pub mod line;
pub mod meter;
pub mod record;
pub mod script;
pub mod speed;
pub mod state;
pub mod time;
pub mod timing;

pub use byte::ByteAssembler;
pub use line::Line;
pub use meter::{SpeedMeter, SpeedVerdict};
pub use record::{
    BusEvent, Direction, Record, RecordKind, SequencingFault, Violation, ViolationClass,
};
pub use script::{ResponseScript, ScriptError};
pub use speed::{SpeedClass, TimingLimits};
pub use state::{StateSpec, TransactionState};
pub use time::{Elapsed, Nanos};
pub use timing::{TimingParam, TimingValidator};

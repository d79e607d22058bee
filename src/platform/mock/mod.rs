//! Mock line bus for testing
//!
//! Replays a fixed, timed list of peer drive changes. The peer does not react
//! to the checker, so this suits unit tests of the detector and the state
//! machine; reactive scenarios use the SITL bus.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```ignore
//! use i2c_checker::platform::mock::MockBus;
//! use i2c_checker::platform::{LineBus, LineId};
//!
//! let scl = LineId(0);
//! let sda = LineId(1);
//! let bus = MockBus::new(scl, sda).peer_drive(1_000, sda, Some(false));
//! assert!(bus.read_pin(sda).unwrap());
//! ```

#![cfg(any(test, feature = "mock"))]

mod bus;

pub use bus::{MockBus, PeerDrive};

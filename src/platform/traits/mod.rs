//! Line collaborator traits
//!
//! This module defines the trait that line backends (simulators, trace
//! replayers) must provide.

pub mod bus;

pub use bus::{LineBus, LineId};

//! Line collaborator abstraction
//!
//! The checker never touches signal lines directly. Everything it needs from
//! the simulation (sampling, weak drives, waiting for edges, the clock) goes
//! through the [`LineBus`] trait defined here.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{BusError, Result};
pub use traits::{LineBus, LineId};

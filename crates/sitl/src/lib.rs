//! Software-in-the-loop I2C bus
//!
//! A simulated pair of open-drain lines shared by a scripted I2C master and
//! the checker. The master only ever pulls a line low or releases it; the
//! checker's weak drives stand in for the pull-up resistors. Time is purely
//! simulated and advances only when the checker waits.

pub mod error;
pub mod master;
pub mod platform;

pub use error::SimulatorError;
pub use master::{MasterScript, MasterTiming, Step};
pub use platform::{SitlBus, SitlLine, SitlTimeSource, Transition};

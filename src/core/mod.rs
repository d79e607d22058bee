//! Checker infrastructure
//!
//! Logging macros and the bounded record log that collects every event and
//! violation the checker reports.

pub mod logging;
pub mod record_log;

pub use record_log::{RecordLog, RECORD_LOG_SIZE};

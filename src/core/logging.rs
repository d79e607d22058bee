//! Logging abstraction
//!
//! Crate-wide logging macros over the `log` facade. The checker reports
//! through these macros only, so the destination is chosen by whichever
//! logger the host installs (or none in tests).
//!
//! Levels used by the checker:
//! - `log_info!`: protocol events (start, byte, acknowledge, speed)
//! - `log_error!`: violations
//! - `log_warn!`: collaborator problems that end a run
//! - `log_debug!`: startup and configuration
//! - `log_trace!`: state transitions and clock stretching

#[doc(hidden)]
pub use log as __log;

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        $crate::core::logging::__log::info!($($arg)*);
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        $crate::core::logging::__log::warn!($($arg)*);
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        $crate::core::logging::__log::error!($($arg)*);
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        $crate::core::logging::__log::debug!($($arg)*);
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        $crate::core::logging::__log::trace!($($arg)*);
    }};
}

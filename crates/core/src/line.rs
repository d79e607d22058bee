//! The two I2C bus lines.

use core::fmt;

/// One of the two shared bus lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    /// Serial clock (SCL)
    Clock,
    /// Serial data (SDA)
    Data,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Clock => write!(f, "SCL"),
            Line::Data => write!(f, "SDA"),
        }
    }
}

//! Simulated open-drain line.
//!
//! The master drives strongly or releases; the checker's weak drive decides
//! the level of a released line.

use i2c_checker::LineId;

/// One simulated bus line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SitlLine {
    id: LineId,
    peer: Option<bool>,
    weak: bool,
}

impl SitlLine {
    /// Released line, pulled high.
    pub fn new(id: LineId) -> Self {
        Self {
            id,
            peer: None,
            weak: true,
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    /// Resolved level; a strong drive wins.
    pub fn level(&self) -> bool {
        self.peer.unwrap_or(self.weak)
    }

    /// Whether the master is driving the line.
    pub fn is_driven(&self) -> bool {
        self.peer.is_some()
    }

    /// Set the master's drive, `None` releases the line.
    pub fn set_peer(&mut self, level: Option<bool>) {
        self.peer = level;
    }

    /// Set the checker's weak drive.
    pub fn set_weak(&mut self, level: bool) {
        self.weak = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_released_line_reads_weak_drive() {
        let mut line = SitlLine::new(LineId(3));
        assert!(line.level());
        line.set_weak(false);
        assert!(!line.level());
        assert!(!line.is_driven());
    }

    #[test]
    fn test_strong_drive_wins() {
        let mut line = SitlLine::new(LineId(3));
        line.set_peer(Some(false));
        assert!(!line.level());
        line.set_peer(None);
        line.set_weak(false);
        line.set_peer(Some(true));
        assert!(line.level());
    }
}

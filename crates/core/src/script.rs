//! Scripted responder decisions
//!
//! The checker answers the initiator from two caller-supplied sequences: the
//! ACK/NACK decision for every byte it acknowledges, and the data bytes it
//! sources during read transactions. Each sequence has its own cursor that
//! only ever moves forward; once a sequence is exhausted it falls back to a
//! fixed default.

use core::fmt;

use heapless::Vec;

/// Maximum number of entries in each script sequence
pub const MAX_SCRIPT_LEN: usize = 256;

/// Decision returned once the ACK sequence is exhausted
pub const DEFAULT_ACK: bool = true;

/// Byte sourced once the data sequence is exhausted
pub const DEFAULT_DATA_BYTE: u8 = 0xab;

/// Errors building a response script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptError {
    /// A sequence does not fit in the script storage
    TooLong {
        /// Which sequence overflowed
        sequence: &'static str,
        /// Requested number of entries
        len: usize,
    },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::TooLong { sequence, len } => write!(
                f,
                "{} sequence has {} entries (maximum {})",
                sequence, len, MAX_SCRIPT_LEN
            ),
        }
    }
}

/// ACK/NACK and outgoing data script with forward-only cursors
#[derive(Debug, Clone, Default)]
pub struct ResponseScript {
    acks: Vec<bool, MAX_SCRIPT_LEN>,
    ack_cursor: usize,
    data: Vec<u8, MAX_SCRIPT_LEN>,
    data_cursor: usize,
}

impl ResponseScript {
    /// Build a script from the ACK decisions and outgoing bytes
    pub fn new(acks: &[bool], data: &[u8]) -> Result<Self, ScriptError> {
        let acks = Vec::from_slice(acks).map_err(|_| ScriptError::TooLong {
            sequence: "ack",
            len: acks.len(),
        })?;
        let data = Vec::from_slice(data).map_err(|_| ScriptError::TooLong {
            sequence: "data",
            len: data.len(),
        })?;
        Ok(Self {
            acks,
            ack_cursor: 0,
            data,
            data_cursor: 0,
        })
    }

    /// Next ACK (`true`) or NACK (`false`) decision
    pub fn next_ack(&mut self) -> bool {
        match self.acks.get(self.ack_cursor) {
            Some(&ack) => {
                self.ack_cursor += 1;
                ack
            }
            None => DEFAULT_ACK,
        }
    }

    /// Next byte to source onto the bus
    pub fn next_data_byte(&mut self) -> u8 {
        match self.data.get(self.data_cursor) {
            Some(&byte) => {
                self.data_cursor += 1;
                byte
            }
            None => DEFAULT_DATA_BYTE,
        }
    }
}

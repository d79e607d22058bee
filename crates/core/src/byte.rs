//! Bit-by-bit byte assembly
//!
//! Per byte the checker is either sinking (sampling the bits the initiator
//! writes) or sourcing (shifting its own byte out MSB first). Exactly one of
//! the two accumulators is active; after a NACK ends sourcing neither is.

/// Data bits per byte, the acknowledge bit is not counted
pub const BITS_PER_BYTE: u8 = 8;

/// Shift register for the byte currently on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteAssembler {
    bit_index: u8,
    read: Option<u8>,
    write: Option<u8>,
}

impl Default for ByteAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteAssembler {
    /// New assembler, sinking
    pub const fn new() -> Self {
        Self {
            bit_index: 0,
            read: Some(0),
            write: None,
        }
    }

    /// Start sinking a fresh byte
    pub fn begin_sink(&mut self) {
        self.bit_index = 0;
        self.read = Some(0);
        self.write = None;
    }

    /// Start sourcing `byte`
    pub fn begin_source(&mut self, byte: u8) {
        self.bit_index = 0;
        self.read = None;
        self.write = Some(byte);
    }

    /// Load the next outgoing byte after the peer acknowledged the previous one
    pub fn load(&mut self, byte: u8) {
        self.write = Some(byte);
    }

    /// Stop sourcing; the data line is released from here on
    pub fn stop_sourcing(&mut self) {
        self.write = None;
    }

    /// Rewind the bit counter for the next byte
    pub fn restart_bits(&mut self) {
        self.bit_index = 0;
    }

    pub fn bit_index(&self) -> u8 {
        self.bit_index
    }

    pub fn is_sinking(&self) -> bool {
        self.read.is_some()
    }

    pub fn is_sourcing(&self) -> bool {
        self.write.is_some()
    }

    /// Bits sampled so far while sinking
    pub fn received(&self) -> Option<u8> {
        self.read
    }

    /// Level to drive for the current bit while sourcing (MSB of the shift register)
    pub fn outgoing_bit(&self) -> Option<bool> {
        self.write.map(|byte| byte & 0x80 != 0)
    }

    /// Account for one clock high phase
    ///
    /// `sampled` is the data line level, used only when sinking. Returns the
    /// bit index after the clock; it saturates at [`BITS_PER_BYTE`].
    pub fn clock_bit(&mut self, sampled: bool) -> u8 {
        if let Some(read) = self.read.as_mut() {
            *read = (*read << 1) | sampled as u8;
        }
        if let Some(write) = self.write.as_mut() {
            *write <<= 1;
        }
        self.bit_index = (self.bit_index + 1).min(BITS_PER_BYTE);
        self.bit_index
    }

    /// Whether all eight data bits have been clocked
    pub fn is_complete(&self) -> bool {
        self.bit_index >= BITS_PER_BYTE
    }
}

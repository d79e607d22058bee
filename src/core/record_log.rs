//! Record ring buffer
//!
//! Fixed-capacity history of checker records, backed by a heapless
//! `HistoryBuf`. The oldest record is evicted when full and the loss is
//! counted, so a long scenario degrades to "most recent records" instead of
//! growing without bound.

use heapless::HistoryBuf;
use i2c_checker_core::{Record, Violation};

/// Buffer capacity in number of records
pub const RECORD_LOG_SIZE: usize = 512;

/// Ring buffer of checker records
pub struct RecordLog {
    buffer: HistoryBuf<Record, RECORD_LOG_SIZE>,
    overflow_count: u32,
}

impl RecordLog {
    /// Create a new empty record log
    pub const fn new() -> Self {
        Self {
            buffer: HistoryBuf::new(),
            overflow_count: 0,
        }
    }

    /// Append a record
    ///
    /// If the buffer is full, the oldest record is evicted and
    /// overflow_count is incremented.
    pub fn push(&mut self, record: Record) {
        if self.buffer.len() == RECORD_LOG_SIZE {
            self.overflow_count = self.overflow_count.saturating_add(1);
        }
        self.buffer.write(record);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Return the number of records lost due to buffer overflow
    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }

    /// Iterate over records in oldest-first order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.buffer.oldest_ordered()
    }

    /// Iterate over the violations only
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.iter().filter_map(Record::as_violation)
    }

    /// Rendered text stream, one line per record
    pub fn lines(&self) -> Vec<String> {
        self.iter().map(|record| record.to_string()).collect()
    }

    /// Drain all records, oldest first
    ///
    /// The buffer is cleared after draining; overflow_count is kept.
    pub fn drain(&mut self) -> Vec<Record> {
        let records = self.iter().copied().collect();
        self.buffer.clear();
        records
    }

    /// Clear all records
    ///
    /// Does not reset overflow_count.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for RecordLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RecordLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordLog")
            .field("len", &self.len())
            .field("overflow_count", &self.overflow_count)
            .finish()
    }
}

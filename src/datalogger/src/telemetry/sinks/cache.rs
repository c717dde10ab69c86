use alloc::boxed::Box;
use alloc::vec;
use rtt_target::rprintln;

use crate::telemetry::codecs::timestamp::Timestamp;

/// Bytes kept free at the end of the cache for the terminator.
pub const CACHE_MARGIN: usize = 10;

/// In-memory batch of records waiting for the transmitter.
///
/// Records are stored as `<stamp><record> ` back to back and the contents are
/// always NUL terminated. The first record of an empty cache carries an
/// absolute stamp.
pub struct DataCache {
    buffer: Box<[u8]>,
    cache_bytes: usize,
}

impl DataCache {
    pub fn new(capacity: usize) -> Self {
        DataCache {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            cache_bytes: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    fn limit(&self) -> usize {
        self.capacity().saturating_sub(CACHE_MARGIN)
    }

    pub fn len(&self) -> usize {
        self.cache_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.cache_bytes == 0
    }

    /// Cached records, without the terminator.
    pub fn contents(&self) -> &[u8] {
        &self.buffer[..self.cache_bytes]
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        let end = (self.cache_bytes + 1).min(self.capacity());
        &self.buffer[..end]
    }

    pub fn clear(&mut self) {
        self.cache_bytes = 0;
        if let Some(first) = self.buffer.first_mut() {
            *first = 0;
        }
    }

    /// Appends a record, or drops it whole if it would cross the margin.
    pub fn push(&mut self, data_time: u32, last_data_time: u32, record: &[u8]) -> bool {
        let stamp = Timestamp::select(data_time, last_data_time, self.is_empty()).encode();
        let needed = stamp.len() + record.len() + 1;
        if self.cache_bytes + needed > self.limit() {
            rprintln!("cache full, dropped {} bytes", needed);
            return false;
        }

        let mut cursor = self.cache_bytes;
        self.buffer[cursor..cursor + stamp.len()].copy_from_slice(stamp.as_bytes());
        cursor += stamp.len();
        self.buffer[cursor..cursor + record.len()].copy_from_slice(record);
        cursor += record.len();
        self.buffer[cursor] = b' ';
        cursor += 1;
        self.buffer[cursor] = 0;
        self.cache_bytes = cursor;
        true
    }
}

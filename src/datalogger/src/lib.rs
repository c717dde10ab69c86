#![cfg_attr(not(test), no_std)]

mod datalogger;
pub mod error;
mod telemetry;
#[cfg(test)]
mod test_support;

extern crate alloc;
use alloc::boxed::Box;
use rtt_target::rprintln;
use telelog_board::{SerialStream, StorageDevice};

pub use crate::datalogger::payloads::{LoggerSetPayload, LoggerSettingsValues};
pub use crate::datalogger::settings::{LoggerSettings, SinkToggles, LOGGER_SETTINGS_SIZE};
pub use crate::error::LoggerError;
pub use crate::telemetry::codecs::record_codec::{encode as encode_record, Reading, RecordBuf};
pub use crate::telemetry::codecs::timestamp::Timestamp;
pub use crate::telemetry::sinks::cache::{DataCache, CACHE_MARGIN};

use crate::telemetry::codecs::record_codec;
use crate::telemetry::sinks::record_file::RecordFile;
use crate::telemetry::sinks::serial::SerialSink;

/// PID the logger uses to report its own file size.
pub const PID_DATA_SIZE: u16 = 0x80;

/// Formats sensor readings into timestamped text records and hands them to
/// whichever sinks are configured: the CSV log file, the transmission cache
/// and the live serial stream.
///
/// Each `log_*` call formats a record, dispatches it to the cache and serial
/// sinks, then records it to the file. The caller advances the clock with
/// `set_data_time` before logging.
pub struct DataLogger {
    settings: LoggerSettings,

    data_time: u32,
    last_data_time: u32,
    data_size: u32,

    cache: Option<DataCache>,
    record_file: Option<RecordFile>,
    serial: Option<SerialSink>,
}

impl DataLogger {
    pub fn new(settings: LoggerSettings) -> Self {
        let settings = settings.configure_defaults();
        let cache = if settings.toggles.data_cache() {
            Some(DataCache::new(usize::from(settings.cache_size)))
        } else {
            None
        };
        DataLogger {
            settings,
            data_time: 0,
            last_data_time: 0,
            data_size: 0,
            cache,
            record_file: None,
            serial: None,
        }
    }

    /// Attaches the card the log files go to. Ignored when the data log is off.
    pub fn with_storage(mut self, storage: Box<dyn StorageDevice>) -> Self {
        if self.settings.toggles.data_log() {
            self.record_file = Some(RecordFile::new(storage));
        } else {
            rprintln!("data log disabled, storage not attached");
        }
        self
    }

    /// Attaches the live output port. Ignored when data out is off.
    pub fn with_serial(mut self, port: Box<dyn SerialStream>) -> Self {
        if self.settings.toggles.data_out() {
            self.serial = Some(SerialSink::new(port, self.settings.stream_baudrate));
        } else {
            rprintln!("data out disabled, serial not attached");
        }
        self
    }

    pub fn init_sender(&mut self) {
        if let Some(serial) = self.serial.as_mut() {
            serial.begin();
        }
    }

    pub fn settings(&self) -> &LoggerSettings {
        &self.settings
    }

    pub fn set_data_time(&mut self, data_time: u32) {
        self.data_time = data_time;
    }

    pub fn data_time(&self) -> u32 {
        self.data_time
    }

    pub fn last_data_time(&self) -> u32 {
        self.last_data_time
    }

    /// Bytes written to the current file.
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    pub fn cache(&self) -> Option<&DataCache> {
        self.cache.as_ref()
    }

    /// For the transmitter, which drains the cache once it has sent it.
    pub fn cache_mut(&mut self) -> Option<&mut DataCache> {
        self.cache.as_mut()
    }

    pub fn is_file_open(&self) -> bool {
        self.record_file.as_ref().map_or(false, |file| file.is_open())
    }

    pub fn file_index(&self) -> Option<u16> {
        self.record_file.as_ref().and_then(|file| file.file_index())
    }

    pub fn file_path(&self) -> Option<&str> {
        self.record_file.as_ref().and_then(|file| file.path())
    }

    pub fn log(&mut self, pid: u16, reading: Reading) -> Result<(), LoggerError> {
        let record = record_codec::encode(pid, &reading)?;
        self.log_raw(record.as_bytes())
    }

    /// Logs bytes the caller already formatted.
    pub fn log_raw(&mut self, record: &[u8]) -> Result<(), LoggerError> {
        self.dispatch(record);
        self.record(record)
    }

    pub fn log_pid(&mut self, pid: u16) -> Result<(), LoggerError> {
        self.log(pid, Reading::Empty)
    }

    pub fn log_data(&mut self, pid: u16, value: i16) -> Result<(), LoggerError> {
        self.log(pid, Reading::Int(value))
    }

    pub fn log_data_i32(&mut self, pid: u16, value: i32) -> Result<(), LoggerError> {
        self.log(pid, Reading::Long(value))
    }

    pub fn log_data_u32(&mut self, pid: u16, value: u32) -> Result<(), LoggerError> {
        self.log(pid, Reading::Unsigned(value))
    }

    pub fn log_data_triple(
        &mut self,
        pid: u16,
        value1: i16,
        value2: i16,
        value3: i16,
    ) -> Result<(), LoggerError> {
        self.log(pid, Reading::Triple(value1, value2, value3))
    }

    /// `value` is in millionths of a degree.
    pub fn log_coordinate(&mut self, pid: u16, value: i32) -> Result<(), LoggerError> {
        self.log(pid, Reading::Coordinate(value))
    }

    pub fn log_data_size(&mut self) -> Result<(), LoggerError> {
        self.log_data_u32(PID_DATA_SIZE, self.data_size)
    }

    fn dispatch(&mut self, record: &[u8]) {
        if let Some(cache) = self.cache.as_mut() {
            cache.push(self.data_time, self.last_data_time, record);
        }
        if let Some(serial) = self.serial.as_mut() {
            serial.send(record);
        }
    }

    fn record(&mut self, record: &[u8]) -> Result<(), LoggerError> {
        let mut result = Ok(());
        if let Some(record_file) = self.record_file.as_mut() {
            if record_file.is_open() {
                let stamp =
                    Timestamp::select(self.data_time, self.last_data_time, self.data_size == 0);
                let (written, written_result) = record_file.write_record(stamp, record);
                self.data_size = self.data_size.wrapping_add(written);
                if let Err(err) = written_result {
                    rprintln!("record write failed: {:?}", err);
                    result = Err(err);
                }
            }
        }
        // advances even without a file so cache stamps stay relative
        self.last_data_time = self.data_time;
        result
    }

    /// Opens the next log file and returns its index (always nonzero).
    ///
    /// With `date_time` nonzero the file is named after it, otherwise the first
    /// unused `DAT#####.CSV` is taken. A file that is still open gets flushed
    /// and closed first.
    pub fn open_file(&mut self, date_time: u32) -> Result<u16, LoggerError> {
        let record_file = self.record_file.as_mut().ok_or(LoggerError::LogDisabled)?;
        if record_file.is_open() {
            rprintln!("log file still open, closing it");
            let closed = record_file.close();
            self.data_size = 0;
            closed?;
        }
        let index = record_file.open(date_time)?;
        self.data_size = 0;
        Ok(index)
    }

    pub fn close_file(&mut self) -> Result<(), LoggerError> {
        let record_file = self.record_file.as_mut().ok_or(LoggerError::LogDisabled)?;
        let closed = record_file.close();
        self.data_size = 0;
        closed
    }

    pub fn flush_file(&mut self) -> Result<(), LoggerError> {
        self.record_file
            .as_mut()
            .ok_or(LoggerError::LogDisabled)?
            .flush()
    }
}

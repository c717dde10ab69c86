use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use rtt_target::rprintln;
use telelog_board::{StorageDevice, StorageFile, DATA_ROOT, LINE_TERMINATOR};

use crate::error::LoggerError;
use crate::telemetry::codecs::timestamp::Timestamp;

/// The persistent sink: one append-only CSV file at a time under `/DATA`.
pub struct RecordFile {
    storage: Box<dyn StorageDevice>,
    file: Option<Box<dyn StorageFile>>,
    file_index: u16,
    path: String,
}

impl RecordFile {
    pub fn new(storage: Box<dyn StorageDevice>) -> Self {
        RecordFile {
            storage,
            file: None,
            file_index: 0,
            path: String::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn file_index(&self) -> Option<u16> {
        self.file.as_ref().map(|_| self.file_index)
    }

    pub fn path(&self) -> Option<&str> {
        self.file.as_ref().map(|_| self.path.as_str())
    }

    fn index_path(index: u16) -> String {
        format!("{}/DAT{:05}.CSV", DATA_ROOT, index)
    }

    fn choose_path(&mut self, date_time: u32) -> Result<(String, u16), LoggerError> {
        if !self.storage.exists(DATA_ROOT) {
            self.storage.mkdir(DATA_ROOT)?;
            return Ok((Self::index_path(1), 1));
        }

        if date_time != 0 {
            // date and time as file name, appended to if it already exists
            return Ok((format!("{}/{:08}.CSV", DATA_ROOT, date_time), 1));
        }

        for index in 1..=u16::MAX {
            let path = Self::index_path(index);
            if !self.storage.exists(&path) {
                return Ok((path, index));
            }
        }
        Err(LoggerError::FileIndexExhausted(DATA_ROOT))
    }

    /// Expects the sink to be closed; the caller closes a previous file first.
    pub fn open(&mut self, date_time: u32) -> Result<u16, LoggerError> {
        let (path, index) = self.choose_path(date_time)?;
        let file = match self.storage.open_append(&path) {
            Ok(file) => file,
            Err(err) => {
                rprintln!("open {} failed: {:?}", path, err);
                return Err(err.into());
            }
        };
        rprintln!("logging to {}", path);
        self.file = Some(file);
        self.file_index = index;
        self.path = path;
        Ok(index)
    }

    pub fn flush(&mut self) -> Result<(), LoggerError> {
        let file = self.file.as_mut().ok_or(LoggerError::FileNotOpen)?;
        file.flush()?;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), LoggerError> {
        if let Some(mut file) = self.file.take() {
            rprintln!("closing {}", self.path);
            // release the handle even when the flush fails
            let flushed = file.flush();
            let closed = file.close();
            flushed?;
            closed?;
        }
        Ok(())
    }

    /// Writes `<stamp><record>\r\n` and returns the bytes that reached the card
    /// together with the first failure, if any. The terminator is attempted even
    /// after a failed write so the next record starts on its own line.
    pub fn write_record(
        &mut self,
        stamp: Timestamp,
        record: &[u8],
    ) -> (u32, Result<(), LoggerError>) {
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return (0, Err(LoggerError::FileNotOpen)),
        };
        let stamp = stamp.encode();
        let mut written = 0;
        let mut first_error = None;
        for bytes in [stamp.as_bytes(), record] {
            match file.write(bytes) {
                Ok(count) => written += count,
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match file.write(LINE_TERMINATOR) {
            Ok(_) => written += LINE_TERMINATOR.len(),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
        let result = match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        };
        (written as u32, result)
    }
}

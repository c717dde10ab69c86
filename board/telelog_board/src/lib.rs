#![cfg_attr(not(test), no_std)]
extern crate alloc;
use alloc::boxed::Box;

use thiserror::Error;

/// Directory every log file lives under.
pub const DATA_ROOT: &str = "/DATA";
pub const LINE_TERMINATOR: &[u8] = b"\r\n";
pub const DEFAULT_STREAM_BAUDRATE: u32 = 115200;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    #[error("path not found")]
    NotFound,
    #[error("medium is full")]
    NoSpace,
    #[error("storage i/o failure")]
    Io,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    #[error("serial port not started")]
    NotStarted,
    #[error("serial i/o failure")]
    Io,
}

/// Removable storage as the logger sees it: a flat namespace of absolute paths.
pub trait StorageDevice {
    fn exists(&mut self, path: &str) -> bool;
    fn mkdir(&mut self, path: &str) -> Result<(), StorageError>;
    /// Open for writing, creating the file if needed and positioning at its end.
    fn open_append(&mut self, path: &str) -> Result<Box<dyn StorageFile>, StorageError>;
}

pub trait StorageFile {
    /// Returns the number of bytes accepted by the medium.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, StorageError>;
    fn flush(&mut self) -> Result<(), StorageError>;
    fn close(self: Box<Self>) -> Result<(), StorageError>;
}

pub trait SerialStream {
    fn begin(&mut self, baudrate: u32);
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SerialError>;

    fn write_line_terminator(&mut self) -> Result<(), SerialError> {
        self.write(LINE_TERMINATOR).map(|_| ())
    }
}

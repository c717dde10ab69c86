use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rtt_target::rprintln;
use telelog_board::{SerialError, SerialStream, StorageDevice, StorageError, StorageFile};

fn storage_error(err: io::Error) -> StorageError {
    rprintln!("storage: {}", err);
    match err.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound,
        _ => StorageError::Io,
    }
}

/// A directory on the host standing in for the card; `/DATA/DAT00001.CSV`
/// lands in `<mount>/DATA/DAT00001.CSV`.
pub struct DirectoryStorage {
    mount: PathBuf,
}

impl DirectoryStorage {
    pub fn new(mount: impl Into<PathBuf>) -> Self {
        DirectoryStorage {
            mount: mount.into(),
        }
    }

    pub fn mount(&self) -> &Path {
        &self.mount
    }

    pub fn host_path(&self, path: &str) -> PathBuf {
        self.mount.join(path.trim_start_matches('/'))
    }
}

impl StorageDevice for DirectoryStorage {
    fn exists(&mut self, path: &str) -> bool {
        self.host_path(path).exists()
    }

    fn mkdir(&mut self, path: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.host_path(path)).map_err(storage_error)
    }

    fn open_append(&mut self, path: &str) -> Result<Box<dyn StorageFile>, StorageError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.host_path(path))
            .map_err(storage_error)?;
        Ok(Box::new(HostFile {
            writer: BufWriter::new(file),
        }))
    }
}

pub struct HostFile {
    writer: BufWriter<File>,
}

impl StorageFile for HostFile {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, StorageError> {
        self.writer.write_all(bytes).map_err(storage_error)?;
        Ok(bytes.len())
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        self.writer.flush().map_err(storage_error)?;
        self.writer.get_ref().sync_data().map_err(storage_error)
    }

    fn close(mut self: Box<Self>) -> Result<(), StorageError> {
        self.writer.flush().map_err(storage_error)
    }
}

/// Live output over any byte sink; stdout stands in for the UART.
pub struct WriterSerial<W: Write> {
    writer: W,
    baudrate: Option<u32>,
}

impl WriterSerial<io::Stdout> {
    pub fn stdout() -> Self {
        WriterSerial::new(io::stdout())
    }
}

impl<W: Write> WriterSerial<W> {
    pub fn new(writer: W) -> Self {
        WriterSerial {
            writer,
            baudrate: None,
        }
    }

    pub fn baudrate(&self) -> Option<u32> {
        self.baudrate
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SerialStream for WriterSerial<W> {
    fn begin(&mut self, baudrate: u32) {
        rprintln!("serial begin {}", baudrate);
        self.baudrate = Some(baudrate);
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize, SerialError> {
        if self.baudrate.is_none() {
            return Err(SerialError::NotStarted);
        }
        self.writer.write_all(bytes).map_err(|_| SerialError::Io)?;
        Ok(bytes.len())
    }
}

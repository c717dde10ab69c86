use std::boxed::Box;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use telelog_board::{SerialError, SerialStream, StorageDevice, StorageError, StorageFile, DATA_ROOT};

#[derive(Default)]
pub struct MemoryCard {
    pub dirs: Vec<String>,
    /// flushed contents only
    pub files: BTreeMap<String, Vec<u8>>,
    pub flushes: usize,
    pub closes: usize,
    pub fail_open: bool,
    pub fail_mkdir: bool,
    pub fail_writes: bool,
    pub fail_flush: bool,
    /// one-based count of the single write that fails
    pub fail_write_at: Option<usize>,
    pub writes: usize,
    /// every `DAT#####.CSV` name reports as taken
    pub all_indices_taken: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub card: Rc<RefCell<MemoryCard>>,
}

impl MemoryStorage {
    pub fn with_data_dir() -> Self {
        let storage = MemoryStorage::default();
        storage.card.borrow_mut().dirs.push(DATA_ROOT.to_string());
        storage
    }

    pub fn add_file(&self, path: &str) {
        self.card.borrow_mut().files.insert(path.to_string(), Vec::new());
    }

    pub fn text(&self, path: &str) -> String {
        let card = self.card.borrow();
        let bytes = card.files.get(path).cloned().unwrap_or_default();
        String::from_utf8(bytes).unwrap()
    }
}

impl StorageDevice for MemoryStorage {
    fn exists(&mut self, path: &str) -> bool {
        let card = self.card.borrow();
        if card.all_indices_taken && path.starts_with("/DATA/DAT") {
            return true;
        }
        card.dirs.iter().any(|dir| dir == path) || card.files.contains_key(path)
    }

    fn mkdir(&mut self, path: &str) -> Result<(), StorageError> {
        let mut card = self.card.borrow_mut();
        if card.fail_mkdir {
            return Err(StorageError::Io);
        }
        card.dirs.push(path.to_string());
        Ok(())
    }

    fn open_append(&mut self, path: &str) -> Result<Box<dyn StorageFile>, StorageError> {
        let mut card = self.card.borrow_mut();
        if card.fail_open {
            return Err(StorageError::Io);
        }
        card.files.entry(path.to_string()).or_default();
        Ok(Box::new(MemoryFile {
            card: self.card.clone(),
            path: path.to_string(),
            pending: Vec::new(),
        }))
    }
}

/// Buffers writes until flushed, like a FAT driver with a sector cache.
pub struct MemoryFile {
    card: Rc<RefCell<MemoryCard>>,
    path: String,
    pending: Vec<u8>,
}

impl StorageFile for MemoryFile {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, StorageError> {
        let mut card = self.card.borrow_mut();
        card.writes += 1;
        if card.fail_writes || card.fail_write_at == Some(card.writes) {
            return Err(StorageError::NoSpace);
        }
        self.pending.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        let mut card = self.card.borrow_mut();
        if card.fail_flush {
            return Err(StorageError::Io);
        }
        card.flushes += 1;
        let pending = core::mem::take(&mut self.pending);
        card.files.entry(self.path.clone()).or_default().extend(pending);
        Ok(())
    }

    fn close(mut self: Box<Self>) -> Result<(), StorageError> {
        self.flush()?;
        self.card.borrow_mut().closes += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct SerialLine {
    pub baudrate: Option<u32>,
    pub output: Vec<u8>,
    pub fail_writes: bool,
}

#[derive(Clone, Default)]
pub struct MemorySerial {
    pub line: Rc<RefCell<SerialLine>>,
}

impl MemorySerial {
    pub fn text(&self) -> String {
        String::from_utf8(self.line.borrow().output.clone()).unwrap()
    }
}

impl SerialStream for MemorySerial {
    fn begin(&mut self, baudrate: u32) {
        self.line.borrow_mut().baudrate = Some(baudrate);
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize, SerialError> {
        let mut line = self.line.borrow_mut();
        if line.fail_writes {
            return Err(SerialError::Io);
        }
        line.output.extend_from_slice(bytes);
        Ok(bytes.len())
    }
}

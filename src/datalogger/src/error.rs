use telelog_board::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("record does not fit in {0} bytes")]
    RecordOverflow(usize),
    #[error("no unused file index under {0}")]
    FileIndexExhausted(&'static str),
    #[error("persistent log is disabled")]
    LogDisabled,
    #[error("no file is open")]
    FileNotOpen,
    #[error("invalid settings payload: {0}")]
    InvalidSettings(serde_json::Error),
}

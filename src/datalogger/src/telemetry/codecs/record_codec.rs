use core::fmt::Write;

use util::FixedBuf;

use crate::error::LoggerError;

/// Room for the widest rendering: `FFFF,` plus a triple of `-32768` or a
/// `-2147.483648` coordinate.
pub const RECORD_CAPACITY: usize = 40;

pub type RecordBuf = FixedBuf<RECORD_CAPACITY>;

const COORDINATE_SCALE: i32 = 1_000_000;

/// Value shapes a sensor reading can be logged as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reading {
    Empty,
    Int(i16),
    Long(i32),
    Unsigned(u32),
    Triple(i16, i16, i16),
    /// Degrees scaled by 1,000,000.
    Coordinate(i32),
}

/// Renders `<HEXPID>,<value>` without a record separator.
pub fn encode(pid: u16, reading: &Reading) -> Result<RecordBuf, LoggerError> {
    let mut record = RecordBuf::new();
    let result = match *reading {
        Reading::Empty => write!(record, "{:X},", pid),
        Reading::Int(value) => write!(record, "{:X},{}", pid, value),
        Reading::Long(value) => write!(record, "{:X},{}", pid, value),
        Reading::Unsigned(value) => write!(record, "{:X},{}", pid, value),
        Reading::Triple(value1, value2, value3) => {
            write!(record, "{:X},{},{},{}", pid, value1, value2, value3)
        }
        Reading::Coordinate(value) => write!(
            record,
            "{:X},{}.{:06}",
            pid,
            value / COORDINATE_SCALE,
            value.unsigned_abs() % COORDINATE_SCALE as u32
        ),
    };
    result.map_err(|_| LoggerError::RecordOverflow(RECORD_CAPACITY))?;
    Ok(record)
}
